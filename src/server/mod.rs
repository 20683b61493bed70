//! HTTP server with auto-registered routes
//!
//! `ServerBuilder` registers for every record type:
//! - CRUD routes and a CSV export route
//! - reference checks on write and `?include=` on read
//!
//! plus the dashboard routes (BOQ stats, invoice summary, scope selector)
//! and health checks.

pub mod builder;
pub mod context;
pub mod entity_registry;
pub mod exposure;
pub mod host;
pub mod services;

pub use builder::ServerBuilder;
pub use context::ApiContext;
pub use entity_registry::{CrudDescriptor, EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
pub use host::ServerHost;
pub use services::ServiceSet;
