//! In-memory implementation of DataService for development and tests

use crate::core::error::{EntityError, LedgerError, LedgerResult, StorageError};
use crate::core::{Data, DataService, ListFilter};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// In-memory record service
///
/// Uses RwLock for thread-safe access. Cloning shares the same map.
#[derive(Clone)]
pub struct InMemoryDataService<T> {
    records: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T> InMemoryDataService<T> {
    /// Create a new, empty in-memory service
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T> Default for InMemoryDataService<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<G>(e: PoisonError<G>) -> LedgerError {
    StorageError::LockPoisoned {
        message: e.to_string(),
    }
    .into()
}

#[async_trait]
impl<T: Data> DataService<T> for InMemoryDataService<T> {
    async fn create(&self, record: T) -> LedgerResult<T> {
        let mut records = self.records.write().map_err(poisoned)?;

        if records.contains_key(&record.id()) {
            return Err(EntityError::AlreadyExists {
                entity_type: T::resource_name_singular().to_string(),
                id: record.id(),
            }
            .into());
        }
        records.insert(record.id(), record.clone());

        Ok(record)
    }

    async fn get(&self, id: &Uuid) -> LedgerResult<Option<T>> {
        let records = self.records.read().map_err(poisoned)?;

        Ok(records.get(id).cloned())
    }

    async fn list(&self, filter: &ListFilter) -> LedgerResult<Vec<T>> {
        let records = self.records.read().map_err(poisoned)?;

        let mut matched: Vec<T> = records
            .values()
            .filter(|r| filter.matches(*r))
            .cloned()
            .collect();
        matched.sort_by_key(|r| (r.created_at(), r.id()));

        Ok(matched)
    }

    async fn update(&self, id: &Uuid, record: T) -> LedgerResult<T> {
        let mut records = self.records.write().map_err(poisoned)?;

        let slot = records
            .get_mut(id)
            .ok_or_else(|| LedgerError::not_found(T::resource_name_singular(), *id))?;
        *slot = record.clone();

        Ok(record)
    }

    async fn delete(&self, id: &Uuid) -> LedgerResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;

        records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::not_found(T::resource_name_singular(), *id))
    }
}
