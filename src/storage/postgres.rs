//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresDataService<T>` backed by a `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! siteledger = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Every record type shares one `records` table keyed by
//! `(entity_type, id)`. The record itself is stored as JSONB; scope and
//! field filters are applied after loading, the same way the in-memory
//! backend applies them.

use crate::core::error::{EntityError, LedgerError, LedgerResult};
use crate::core::{Data, DataService, ListFilter};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

/// Apply the required table and index (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> LedgerResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS records (
            entity_type TEXT NOT NULL,
            id UUID NOT NULL,
            data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            PRIMARY KEY (entity_type, id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_records_type_created \
         ON records (entity_type, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Record storage backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// let pool = PgPool::connect(&database_url).await?;
/// ensure_schema(&pool).await?;
/// let invoices = PostgresDataService::<Invoice>::new(pool);
/// ```
#[derive(Clone, Debug)]
pub struct PostgresDataService<T> {
    pool: PgPool,
    _marker: std::marker::PhantomData<T>,
}

impl<T> PostgresDataService<T> {
    /// Create a new `PostgresDataService` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: Data> PostgresDataService<T> {
    fn entity_type() -> &'static str {
        T::resource_name_singular()
    }

    fn decode(data: serde_json::Value) -> LedgerResult<T> {
        serde_json::from_value(data).map_err(|e| {
            EntityError::SerializationError {
                entity_type: Self::entity_type().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl<T: Data> DataService<T> for PostgresDataService<T> {
    async fn create(&self, record: T) -> LedgerResult<T> {
        let result = sqlx::query(
            "INSERT INTO records (entity_type, id, data, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (entity_type, id) DO NOTHING",
        )
        .bind(Self::entity_type())
        .bind(record.id())
        .bind(Json(&record))
        .bind(record.created_at())
        .bind(record.updated_at())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EntityError::AlreadyExists {
                entity_type: Self::entity_type().to_string(),
                id: record.id(),
            }
            .into());
        }

        Ok(record)
    }

    async fn get(&self, id: &Uuid) -> LedgerResult<Option<T>> {
        let row = sqlx::query_as::<_, (serde_json::Value,)>(
            "SELECT data FROM records WHERE entity_type = $1 AND id = $2",
        )
        .bind(Self::entity_type())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(data,)| Self::decode(data)).transpose()
    }

    async fn list(&self, filter: &ListFilter) -> LedgerResult<Vec<T>> {
        let rows = sqlx::query_as::<_, (serde_json::Value,)>(
            "SELECT data FROM records \
             WHERE entity_type = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(Self::entity_type())
        .fetch_all(&self.pool)
        .await?;

        let mut matched = Vec::new();
        for (data,) in rows {
            let record = Self::decode(data)?;
            if filter.matches(&record) {
                matched.push(record);
            }
        }
        Ok(matched)
    }

    async fn update(&self, id: &Uuid, record: T) -> LedgerResult<T> {
        let result = sqlx::query(
            "UPDATE records SET data = $3, updated_at = $4 \
             WHERE entity_type = $1 AND id = $2",
        )
        .bind(Self::entity_type())
        .bind(id)
        .bind(Json(&record))
        .bind(record.updated_at())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found(Self::entity_type(), *id));
        }

        Ok(record)
    }

    async fn delete(&self, id: &Uuid) -> LedgerResult<()> {
        let result = sqlx::query("DELETE FROM records WHERE entity_type = $1 AND id = $2")
            .bind(Self::entity_type())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found(Self::entity_type(), *id));
        }

        Ok(())
    }
}
