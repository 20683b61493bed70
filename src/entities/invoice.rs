//! Client invoices raised against a project

use crate::core::entity::{Data, Record, Reference};
use crate::core::field::FieldValue;
use crate::entities::{document_number, not_blank};
use crate::export::{CsvRecord, number_cell};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Invoice status
///
/// The three known statuses parse case-insensitively. Any other string is
/// kept verbatim so legacy values survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Pending,
    Overdue,
    Other(String),
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Pending => "Pending",
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::Other(s) => s,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }

    /// Color of the status badge on the invoice detail view
    pub fn badge_color(&self) -> BadgeColor {
        match self {
            InvoiceStatus::Paid => BadgeColor::Green,
            InvoiceStatus::Pending => BadgeColor::Yellow,
            InvoiceStatus::Overdue => BadgeColor::Red,
            InvoiceStatus::Other(_) => BadgeColor::Gray,
        }
    }
}

impl From<String> for InvoiceStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "paid" => InvoiceStatus::Paid,
            "pending" => InvoiceStatus::Pending,
            "overdue" => InvoiceStatus::Overdue,
            _ => InvoiceStatus::Other(value),
        }
    }
}

impl From<&str> for InvoiceStatus {
    fn from(value: &str) -> Self {
        InvoiceStatus::from(value.to_string())
    }
}

impl From<InvoiceStatus> for String {
    fn from(value: InvoiceStatus) -> Self {
        match value {
            InvoiceStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

wire_enum! {
    /// Badge colors used by the invoice views
    pub enum BadgeColor {
        Green => "green",
        Yellow => "yellow",
        Red => "red",
        Gray => "gray",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub project_id: Uuid,
    /// Billed party, as printed on the invoice
    pub client: String,
    pub amount: f64,
    #[serde(default)]
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Invoice, "invoice", "invoices");

impl Data for Invoice {
    fn belongs_to(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "invoiceNumber" => Some(FieldValue::String(self.invoice_number.clone())),
            "projectId" => Some(FieldValue::Uuid(self.project_id)),
            "client" => Some(FieldValue::String(self.client.clone())),
            "amount" => Some(FieldValue::Float(self.amount)),
            "status" => Some(FieldValue::String(self.status.to_string())),
            "dueDate" => Some(FieldValue::Date(self.due_date)),
            "createdBy" => Some(FieldValue::Uuid(self.created_by)),
            "createdAt" => Some(FieldValue::DateTime(self.created_at)),
            "updatedAt" => Some(FieldValue::DateTime(self.updated_at)),
            _ => None,
        }
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::to_one("projectId", "project", self.project_id)]
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoice {
    #[validate(custom(function = "document_number"))]
    pub invoice_number: String,
    pub project_id: Uuid,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub client: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub status: Option<InvoiceStatus>,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoice {
    #[validate(custom(function = "document_number"))]
    pub invoice_number: Option<String>,
    pub project_id: Option<Uuid>,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub client: Option<String>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    pub status: Option<InvoiceStatus>,
    pub due_date: Option<NaiveDate>,
}

impl Record for Invoice {
    type Create = CreateInvoice;
    type Update = UpdateInvoice;

    fn from_create(input: CreateInvoice, author: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            invoice_number: input.invoice_number,
            project_id: input.project_id,
            client: input.client,
            amount: input.amount,
            status: input.status.unwrap_or_default(),
            due_date: input.due_date,
            created_by: author,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: UpdateInvoice) {
        if let Some(number) = input.invoice_number {
            self.invoice_number = number;
        }
        if let Some(project_id) = input.project_id {
            self.project_id = project_id;
        }
        if let Some(client) = input.client {
            self.client = client;
        }
        if let Some(amount) = input.amount {
            self.amount = amount;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(due_date) = input.due_date {
            self.due_date = due_date;
        }
    }
}

impl CsvRecord for Invoice {
    fn csv_header() -> &'static [&'static str] {
        &["Invoice Number", "Client", "Project ID", "Amount", "Status", "Due Date"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.invoice_number.clone(),
            self.client.clone(),
            self.project_id.to_string(),
            number_cell(self.amount),
            self.status.to_string(),
            self.due_date.to_string(),
        ]
    }
}
