//! Typed HTTP client for the SiteLedger API
//!
//! [`ApiClient`] speaks to the REST routes; [`Dashboard`] pairs it with a
//! [`SessionStore`](crate::scope::SessionStore) so views follow the
//! acting-as selection and drop responses that arrive after the selection
//! moved on.
//!
//! # Feature flag
//!
//! Gated behind the `client` feature (on by default).

pub mod api;
pub mod dashboard;
pub mod tokens;

pub use api::{ApiClient, ListQuery};
pub use dashboard::Dashboard;
pub use tokens::TokenStore;

/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "SITELEDGER_API_URL";

/// Used when `SITELEDGER_API_URL` is unset
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error("{status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("invalid base url '{0}'")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status of an API error, `None` for transport failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
