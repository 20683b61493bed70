//! Entity traits defining the core abstraction for all record types

use crate::core::field::FieldValue;
use crate::export::CsvRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

/// Base trait for all records in the system.
///
/// All records have:
/// - id: Unique identifier
/// - created_at: Creation timestamp
/// - updated_at: Last modification timestamp
///
/// Implementations are generated by [`impl_entity!`](crate::impl_entity).
pub trait Entity:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The plural resource name used in URLs (e.g., "invoices", "inventory-items")
    fn resource_name() -> &'static str;

    /// The singular name used in storage and error messages (e.g., "inventory_item")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this record
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Bump `updated_at` to now
    fn touch(&mut self);
}

/// Trait for records that can be scoped, filtered and cross-referenced.
pub trait Data: Entity {
    /// Whether this record belongs to `user_id` for scoping purposes
    fn belongs_to(&self, user_id: Uuid) -> bool;

    /// Get the value of a field by its wire (camelCase) name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Foreign references held by this record
    ///
    /// Used both to check references on write and to resolve `?include=`
    /// on read.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// A foreign reference from one record to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Wire name of the field holding the id, e.g. `projectId` or `items[2].inventoryItemId`
    pub field: String,

    /// Key under which the referenced record is embedded by `?include=`
    pub include_as: &'static str,

    /// Singular name of the referenced record type
    pub entity_type: &'static str,

    pub id: Uuid,

    /// Embedded as an array (one entry per reference) rather than an object
    pub many: bool,
}

impl Reference {
    /// A to-one reference, included under `entity_type`
    pub fn to_one(field: &str, entity_type: &'static str, id: Uuid) -> Self {
        Self::named(field, entity_type, entity_type, id)
    }

    /// A to-one reference included under a custom key
    pub fn named(
        field: &str,
        include_as: &'static str,
        entity_type: &'static str,
        id: Uuid,
    ) -> Self {
        Self {
            field: field.to_string(),
            include_as,
            entity_type,
            id,
            many: false,
        }
    }

    /// One element of a to-many reference
    pub fn many(
        field: String,
        include_as: &'static str,
        entity_type: &'static str,
        id: Uuid,
    ) -> Self {
        Self {
            field,
            include_as,
            entity_type,
            id,
            many: true,
        }
    }
}

/// A record type exposed through the generic CRUD routes.
///
/// Ties a record to its write payloads. `Create` builds a fresh record;
/// `Update` is a partial body where absent fields keep their value.
pub trait Record: Data + CsvRecord {
    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    /// Build a new record from a create payload authored by `author`
    fn from_create(input: Self::Create, author: Uuid) -> Self;

    /// Apply a partial update in place
    fn apply_update(&mut self, input: Self::Update);
}
