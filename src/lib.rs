//! # SiteLedger
//!
//! REST backend and typed client for running a construction business:
//! users, projects, invoices, payments, inventory, material requests and
//! bills of quantities (BOQs).
//!
//! ## Features
//!
//! - **Generic CRUD**: one descriptor per record type yields list, get,
//!   create, update, delete and CSV export routes
//! - **User scoping**: elevated roles act as another user or see everything,
//!   everyone else only sees their own records
//! - **Per-route policies**: configurable per entity and operation
//! - **Reference checks**: writes fail when a referenced record is missing;
//!   reads embed references with `?include=`
//! - **Pluggable storage**: in memory by default, PostgreSQL behind the
//!   `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use siteledger::prelude::*;
//!
//! let mut config = AppConfig::load(Some("siteledger.yaml"))?;
//! config.apply_env();
//! config.validate()?;
//!
//! ServerBuilder::new(config).serve().await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod export;
pub mod scope;
pub mod server;
pub mod stats;
pub mod storage;

#[cfg(feature = "client")]
pub mod client;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        AuthContext, AuthPolicy, AuthProvider, Data, DataService, Entity, EntityFetcher,
        EntityPolicies, FieldValue, JwtAuthProvider, LedgerError, LedgerResult, ListFilter,
        PaginatedResponse, QueryParams, Record, Reference, Role, SessionUser,
    };

    // === Records ===
    pub use crate::entities::{
        Boq, BoqLineItem, BoqStatus, InventoryItem, Invoice, InvoiceStatus, MaterialRequest,
        MaterialRequestItem, MaterialRequestStatus, Payment, PaymentType, Project, ProjectStatus,
        User, UserStatus,
    };

    // === Scoping ===
    pub use crate::scope::{RecordScope, ScopeResolver, SelfSelectionPolicy, SessionStore};

    // === Stats & Export ===
    pub use crate::export::{CsvRecord, to_csv};
    pub use crate::stats::{BoqStats, InvoiceSummary};

    // === Storage ===
    pub use crate::storage::InMemoryDataService;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresDataService;

    // === Config ===
    pub use crate::config::{AppConfig, EntityAuthConfig, PolicyOverrides};

    // === Server ===
    pub use crate::server::{ServerBuilder, ServiceSet};

    // === Client ===
    #[cfg(feature = "client")]
    pub use crate::client::{ApiClient, Dashboard, ListQuery};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
