//! Query parameters, list filters and pagination utilities

use crate::core::entity::Data;
use crate::core::error::{LedgerResult, RequestError};
use crate::scope::RecordScope;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use uuid::Uuid;

/// Query parameters for scoping, filtering and pagination
///
/// # Example
/// ```text
/// GET /api/invoices?page=2&limit=10
/// GET /api/invoices?userId=5f0c...&filter={"status":"Paid"}
/// GET /api/payments?invoiceId=8d1e...&sort=amount:desc
/// GET /api/invoices/{id}?include=project
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryParams {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Exact-match filters as a JSON object keyed by wire field name
    pub filter: Option<String>,

    /// `field` or `field:asc` or `field:desc`
    pub sort: Option<String>,

    /// Target user selected by an elevated caller
    pub user_id: Option<String>,

    pub project_id: Option<String>,

    /// Only meaningful for payments
    pub invoice_id: Option<String>,

    /// Comma-separated reference names to embed in a single-record read
    pub include: Option<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            filter: None,
            sort: None,
            user_id: None,
            project_id: None,
            invoice_id: None,
            include: None,
        }
    }
}

impl QueryParams {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Get limit, ensuring it doesn't exceed the maximum
    pub fn limit(&self) -> usize {
        self.limit.clamp(1, 100)
    }

    /// The requested target user, if any. An empty value means "none".
    pub fn user_id(&self) -> LedgerResult<Option<Uuid>> {
        parse_optional_uuid("userId", self.user_id.as_deref())
    }

    pub fn project_id(&self) -> LedgerResult<Option<Uuid>> {
        parse_optional_uuid("projectId", self.project_id.as_deref())
    }

    pub fn invoice_id(&self) -> LedgerResult<Option<Uuid>> {
        parse_optional_uuid("invoiceId", self.invoice_id.as_deref())
    }

    /// Parse the filter JSON string into an object
    pub fn filter_fields(&self) -> LedgerResult<Map<String, Value>> {
        let Some(raw) = self.filter.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(Map::new());
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(RequestError::InvalidQuery {
                message: "filter must be a JSON object".to_string(),
            }
            .into()),
            Err(e) => Err(RequestError::InvalidQuery {
                message: format!("filter is not valid JSON: {}", e),
            }
            .into()),
        }
    }

    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort.as_deref().and_then(SortSpec::parse)
    }

    /// Requested include names, trimmed, empty entries dropped
    pub fn includes(&self) -> Vec<&str> {
        self.include
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_optional_uuid(name: &str, raw: Option<&str>) -> LedgerResult<Option<Uuid>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Uuid::parse_str(s).map(Some).map_err(|_| {
            RequestError::InvalidQuery {
                message: format!("{} '{}' is not a valid id", name, s),
            }
            .into()
        }),
    }
}

/// Parsed `?sort=` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = match raw.split_once(':') {
            Some((f, d)) => (f.trim(), d.trim()),
            None => (raw.trim(), "asc"),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            descending: direction.eq_ignore_ascii_case("desc"),
        })
    }

    /// Stable sort by the field's value. Records lacking the field keep
    /// their relative order.
    pub fn apply<T: Data>(&self, records: &mut [T]) {
        records.sort_by(|a, b| {
            let ord = match (a.field_value(&self.field), b.field_value(&self.field)) {
                (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            if self.descending { ord.reverse() } else { ord }
        });
    }
}

/// What a `list` call should return
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    pub scope: RecordScope,
    pub project_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
    /// Exact-match filters keyed by wire field name
    pub fields: Map<String, Value>,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl ListFilter {
    /// Every record, unfiltered
    pub fn all() -> Self {
        Self {
            scope: RecordScope::All,
            project_id: None,
            invoice_id: None,
            fields: Map::new(),
        }
    }

    pub fn scoped(scope: RecordScope) -> Self {
        Self {
            scope,
            ..Self::all()
        }
    }

    pub fn with_project(mut self, project_id: Option<Uuid>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn with_invoice(mut self, invoice_id: Option<Uuid>) -> Self {
        self.invoice_id = invoice_id;
        self
    }

    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields = fields;
        self
    }

    pub fn matches<T: Data>(&self, record: &T) -> bool {
        let in_scope = match self.scope {
            RecordScope::All => true,
            RecordScope::User(user_id) => record.belongs_to(user_id),
        };
        if !in_scope {
            return false;
        }

        if self
            .project_id
            .is_some_and(|id| !matches_uuid(record, "projectId", id))
        {
            return false;
        }

        if self
            .invoice_id
            .is_some_and(|id| !matches_uuid(record, "invoiceId", id))
        {
            return false;
        }

        self.fields.iter().all(|(field, expected)| {
            record
                .field_value(field)
                .is_some_and(|v| v.matches_json(expected))
        })
    }
}

fn matches_uuid<T: Data>(record: &T, field: &str, id: Uuid) -> bool {
    record
        .field_value(field)
        .and_then(|v| v.as_uuid())
        .is_some_and(|v| v == id)
}

/// Paginated response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The paginated data
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    /// Slice one page out of an already filtered and sorted list
    pub fn paginate(records: Vec<T>, page: usize, limit: usize) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total = records.len();
        let data = records
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Self {
            data,
            pagination: PaginationMeta::new(page, limit, total),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}
