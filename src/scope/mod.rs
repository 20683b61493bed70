//! User scoping
//!
//! Decides whose records a caller sees. Non-elevated roles always see their
//! own records; elevated roles may act as another user or see everything.
//!
//! ```text
//! (signed-in user, selected target) ──▶ ScopeResolver ──▶ effective target
//!                                                    └──▶ RecordScope ──▶ ListFilter
//! ```
//!
//! [`SessionStore`] holds the same state for a long-lived client session and
//! notifies subscribers whenever the selection changes.

pub mod resolver;
pub mod session;

pub use resolver::{ScopeResolver, ScopeView, UserDirectory};
pub use session::{FetchTicket, SessionState, SessionStore};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which records a list query may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "userId", rename_all = "snake_case")]
pub enum RecordScope {
    /// Every record
    All,

    /// Records belonging to one user
    User(Uuid),
}

impl RecordScope {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            RecordScope::All => None,
            RecordScope::User(id) => Some(*id),
        }
    }
}

/// What an elevated user selecting themselves means for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfSelectionPolicy {
    /// Only the user's own records
    #[default]
    OwnRecords,

    /// Same as selecting nobody: every record
    AllRecords,
}
