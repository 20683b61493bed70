//! Stock held on site or in a store

use crate::core::entity::{Data, Record};
use crate::core::field::FieldValue;
use crate::entities::not_blank;
use crate::export::{CsvRecord, number_cell};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub item_name: String,
    pub category: String,
    pub quantity: f64,
    /// Unit of measure, e.g. `bags`, `m3`, `kg`
    pub unit: String,
    #[serde(default)]
    pub location: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(InventoryItem, "inventory_item", "inventory-items");

impl Data for InventoryItem {
    fn belongs_to(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "itemName" => Some(FieldValue::String(self.item_name.clone())),
            "category" => Some(FieldValue::String(self.category.clone())),
            "quantity" => Some(FieldValue::Float(self.quantity)),
            "unit" => Some(FieldValue::String(self.unit.clone())),
            "location" => Some(FieldValue::String(self.location.clone())),
            "createdBy" => Some(FieldValue::Uuid(self.created_by)),
            "createdAt" => Some(FieldValue::DateTime(self.created_at)),
            "updatedAt" => Some(FieldValue::DateTime(self.updated_at)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItem {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub item_name: String,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub quantity: f64,
    #[validate(custom(function = "not_blank"), length(max = 32))]
    pub unit: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryItem {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub item_name: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub quantity: Option<f64>,
    #[validate(custom(function = "not_blank"), length(max = 32))]
    pub unit: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

impl Record for InventoryItem {
    type Create = CreateInventoryItem;
    type Update = UpdateInventoryItem;

    fn from_create(input: CreateInventoryItem, author: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            item_name: input.item_name,
            category: input.category,
            quantity: input.quantity,
            unit: input.unit,
            location: input.location,
            created_by: author,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: UpdateInventoryItem) {
        if let Some(item_name) = input.item_name {
            self.item_name = item_name;
        }
        if let Some(category) = input.category {
            self.category = category;
        }
        if let Some(quantity) = input.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = input.unit {
            self.unit = unit;
        }
        if let Some(location) = input.location {
            self.location = location;
        }
    }
}

impl CsvRecord for InventoryItem {
    fn csv_header() -> &'static [&'static str] {
        &["Item Name", "Category", "Quantity", "Unit", "Location"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.item_name.clone(),
            self.category.clone(),
            number_cell(self.quantity),
            self.unit.clone(),
            self.location.clone(),
        ]
    }
}
