//! Bills of quantities: costed line items for a project

use crate::core::entity::{Data, Record, Reference};
use crate::core::field::FieldValue;
use crate::entities::not_blank;
use crate::export::{CsvRecord, number_cell};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

wire_enum! {
    #[derive(Default)]
    pub enum BoqStatus {
        #[default]
        Draft => "draft",
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BoqLineItem {
    #[validate(custom(function = "not_blank"), length(max = 500))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub quantity: f64,
    #[validate(custom(function = "not_blank"), length(max = 32))]
    pub unit: String,
    #[validate(range(min = 0.0))]
    pub rate: f64,
}

impl BoqLineItem {
    pub fn total(&self) -> f64 {
        self.quantity * self.rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boq {
    pub id: Uuid,
    pub title: String,
    pub project_id: Uuid,
    pub created_by: Uuid,
    #[serde(default)]
    pub status: BoqStatus,
    #[serde(default)]
    pub items: Vec<BoqLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Boq, "boq", "boqs");

impl Boq {
    /// Sum of all line totals
    pub fn total_amount(&self) -> f64 {
        self.items.iter().map(BoqLineItem::total).sum()
    }
}

impl Data for Boq {
    fn belongs_to(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "title" => Some(FieldValue::String(self.title.clone())),
            "projectId" => Some(FieldValue::Uuid(self.project_id)),
            "createdBy" => Some(FieldValue::Uuid(self.created_by)),
            "status" => Some(FieldValue::String(self.status.to_string())),
            "totalAmount" => Some(FieldValue::Float(self.total_amount())),
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
pub struct CreateBoq {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub title: String,
    pub project_id: Uuid,
    pub status: Option<BoqStatus>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<BoqLineItem>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoq {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub title: Option<String>,
    pub project_id: Option<Uuid>,
    pub status: Option<BoqStatus>,
    #[validate(nested)]
    pub items: Option<Vec<BoqLineItem>>,
}

impl Record for Boq {
    type Create = CreateBoq;
    type Update = UpdateBoq;

    fn from_create(input: CreateBoq, author: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            project_id: input.project_id,
            created_by: author,
            status: input.status.unwrap_or_default(),
            items: input.items,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: UpdateBoq) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(project_id) = input.project_id {
            self.project_id = project_id;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(items) = input.items {
            self.items = items;
        }
    }
}

impl CsvRecord for Boq {
    fn csv_header() -> &'static [&'static str] {
        &["Title", "Project ID", "Status", "Items", "Total Amount", "Created At"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.project_id.to_string(),
            self.status.to_string(),
            self.items.len().to_string(),
            number_cell(self.total_amount()),
            self.created_at.to_rfc3339(),
        ]
    }
}
