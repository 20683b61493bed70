//! Service traits for record storage and cross-record lookups

use crate::core::entity::Data;
use crate::core::error::{EntityError, LedgerResult};
use crate::core::query::ListFilter;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Service trait for managing records of one type
///
/// Implementations provide CRUD operations for a specific record type.
/// The server is agnostic to the underlying storage mechanism.
#[async_trait]
pub trait DataService<T: Data>: Send + Sync {
    /// Store a new record. Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, record: T) -> LedgerResult<T>;

    /// Get a record by ID
    async fn get(&self, id: &Uuid) -> LedgerResult<Option<T>>;

    /// List records matching `filter`, oldest first
    async fn list(&self, filter: &ListFilter) -> LedgerResult<Vec<T>>;

    /// Replace an existing record. Fails with `NotFound` if absent.
    async fn update(&self, id: &Uuid, record: T) -> LedgerResult<T>;

    /// Hard-delete a record. Fails with `NotFound` if absent.
    async fn delete(&self, id: &Uuid) -> LedgerResult<()>;
}

/// Type-erased lookup used for reference checks and `?include=`
#[async_trait]
pub trait EntityFetcher: Send + Sync {
    /// Fetch a record as JSON, `None` if it does not exist
    async fn fetch_as_json(&self, id: &Uuid) -> LedgerResult<Option<Value>>;

    /// Whether a record with this id exists
    async fn exists(&self, id: &Uuid) -> LedgerResult<bool> {
        Ok(self.fetch_as_json(id).await?.is_some())
    }
}

/// Adapts any [`DataService`] into an [`EntityFetcher`]
pub struct ServiceFetcher<T: Data> {
    service: Arc<dyn DataService<T>>,
}

impl<T: Data> ServiceFetcher<T> {
    pub fn new(service: Arc<dyn DataService<T>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<T: Data> EntityFetcher for ServiceFetcher<T> {
    async fn fetch_as_json(&self, id: &Uuid) -> LedgerResult<Option<Value>> {
        match self.service.get(id).await? {
            Some(record) => serde_json::to_value(record).map(Some).map_err(|e| {
                EntityError::SerializationError {
                    entity_type: T::resource_name_singular().to_string(),
                    message: e.to_string(),
                }
                .into()
            }),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: &Uuid) -> LedgerResult<bool> {
        Ok(self.service.get(id).await?.is_some())
    }
}
