//! Core module containing the fundamental traits and types

pub mod auth;
pub mod entity;
pub mod error;
pub mod field;
pub mod query;
pub mod service;
pub mod token;

pub use auth::{
    AuthContext, AuthPolicy, AuthProvider, EntityPolicies, JwtAuthProvider, Role, SessionUser,
};
pub use entity::{Data, Entity, Record, Reference};
pub use error::{LedgerError, LedgerResult};
pub use field::FieldValue;
pub use query::{ListFilter, PaginatedResponse, PaginationMeta, QueryParams, SortSpec};
pub use service::{DataService, EntityFetcher, ServiceFetcher};
pub use token::{Claims, TokenError, TokenSigner};
