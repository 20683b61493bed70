//! Requests for material drawn from inventory

use crate::core::entity::{Data, Record, Reference};
use crate::core::field::FieldValue;
use crate::entities::{document_number, not_blank};
use crate::export::CsvRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

wire_enum! {
    #[derive(Default)]
    pub enum MaterialRequestStatus {
        #[default]
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Fulfilled => "fulfilled",
    }
}

/// One requested line, embedded in its request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequestItem {
    pub inventory_item_id: Uuid,
    #[validate(range(min = 0.0))]
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub id: Uuid,
    pub request_number: String,
    pub purpose: String,
    #[serde(default)]
    pub status: MaterialRequestStatus,
    pub items: Vec<MaterialRequestItem>,
    pub requested_by: Uuid,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(MaterialRequest, "material_request", "material-requests");

impl MaterialRequest {
    /// `MR-` followed by the first eight hex digits of the id
    fn generated_number(id: Uuid) -> String {
        let simple = id.simple().to_string().to_ascii_uppercase();
        format!("MR-{}", &simple[..8])
    }
}

impl Data for MaterialRequest {
    fn belongs_to(&self, user_id: Uuid) -> bool {
        self.requested_by == user_id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "requestNumber" => Some(FieldValue::String(self.request_number.clone())),
            "purpose" => Some(FieldValue::String(self.purpose.clone())),
            "status" => Some(FieldValue::String(self.status.to_string())),
            "requestedBy" => Some(FieldValue::Uuid(self.requested_by)),
            "projectId" => Some(self.project_id.into()),
            "itemCount" => Some(FieldValue::Integer(self.items.len() as i64)),
            "createdAt" => Some(FieldValue::DateTime(self.created_at)),
            "updatedAt" => Some(FieldValue::DateTime(self.updated_at)),
            _ => None,
        }
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = Vec::with_capacity(self.items.len() + 1);
        if let Some(project_id) = self.project_id {
            refs.push(Reference::to_one("projectId", "project", project_id));
        }
        for (i, item) in self.items.iter().enumerate() {
            refs.push(Reference::many(
                format!("items[{}].inventoryItemId", i),
                "inventoryItems",
                "inventory_item",
                item.inventory_item_id,
            ));
        }
        refs
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialRequest {
    /// Generated from the id when absent
    #[validate(custom(function = "document_number"))]
    pub request_number: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 500))]
    pub purpose: String,
    #[validate(length(min = 1), nested)]
    pub items: Vec<MaterialRequestItem>,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialRequest {
    #[validate(custom(function = "not_blank"), length(max = 500))]
    pub purpose: Option<String>,
    pub status: Option<MaterialRequestStatus>,
    #[validate(length(min = 1), nested)]
    pub items: Option<Vec<MaterialRequestItem>>,
    pub project_id: Option<Uuid>,
}

impl Record for MaterialRequest {
    type Create = CreateMaterialRequest;
    type Update = UpdateMaterialRequest;

    fn from_create(input: CreateMaterialRequest, author: Uuid) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        Self {
            id,
            request_number: input
                .request_number
                .unwrap_or_else(|| Self::generated_number(id)),
            purpose: input.purpose,
            status: MaterialRequestStatus::Pending,
            items: input.items,
            requested_by: author,
            project_id: input.project_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: UpdateMaterialRequest) {
        if let Some(purpose) = input.purpose {
            self.purpose = purpose;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(items) = input.items {
            self.items = items;
        }
        if input.project_id.is_some() {
            self.project_id = input.project_id;
        }
    }
}

impl CsvRecord for MaterialRequest {
    fn csv_header() -> &'static [&'static str] {
        &["Request Number", "Purpose", "Status", "Items", "Requested By", "Created At"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.request_number.clone(),
            self.purpose.clone(),
            self.status.to_string(),
            self.items.len().to_string(),
            self.requested_by.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}
