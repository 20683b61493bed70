//! Resolution of the effective target user and record scope

use crate::core::auth::{Role, SessionUser};
use crate::entities::UserSummary;
use crate::scope::{RecordScope, SelfSelectionPolicy};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use uuid::Uuid;

/// Turns (signed-in user, selected target) into whose data is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeResolver {
    elevated: Vec<Role>,
    self_selection: SelfSelectionPolicy,
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new(Role::DEFAULT_ELEVATED.to_vec(), SelfSelectionPolicy::default())
    }
}

impl ScopeResolver {
    pub fn new(elevated: Vec<Role>, self_selection: SelfSelectionPolicy) -> Self {
        Self {
            elevated,
            self_selection,
        }
    }

    pub fn is_elevated(&self, role: Role) -> bool {
        self.elevated.contains(&role)
    }

    pub fn elevated_roles(&self) -> &[Role] {
        &self.elevated
    }

    pub fn self_selection(&self) -> SelfSelectionPolicy {
        self.self_selection
    }

    /// The user whose data the caller is looking at
    ///
    /// Elevated roles honor `selected`; everyone else always gets their own
    /// id, whatever is stored.
    pub fn effective_target(&self, user: &SessionUser, selected: Option<Uuid>) -> Uuid {
        if self.is_elevated(user.role) {
            selected.unwrap_or(user.id)
        } else {
            user.id
        }
    }

    /// Which records list queries should return
    pub fn record_scope(&self, user: &SessionUser, selected: Option<Uuid>) -> RecordScope {
        if !self.is_elevated(user.role) {
            return RecordScope::User(user.id);
        }
        match selected {
            None => RecordScope::All,
            Some(target) if target != user.id => RecordScope::User(target),
            Some(_) => match self.self_selection {
                SelfSelectionPolicy::OwnRecords => RecordScope::User(user.id),
                SelfSelectionPolicy::AllRecords => RecordScope::All,
            },
        }
    }

    /// Load the users an elevated caller may select
    ///
    /// `load` is only invoked for elevated roles. A failed load degrades to
    /// [`UserDirectory::OwnOnly`] instead of surfacing an error.
    pub async fn load_directory<F, Fut, E>(&self, user: &SessionUser, load: F) -> UserDirectory
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<UserSummary>, E>>,
        E: Display,
    {
        if !self.is_elevated(user.role) {
            return UserDirectory::OwnOnly;
        }
        match load().await {
            Ok(users) => UserDirectory::Available(users),
            Err(e) => {
                tracing::warn!(
                    user_id = %user.id,
                    error = %e,
                    "user directory unavailable, showing own data only"
                );
                UserDirectory::OwnOnly
            }
        }
    }
}

/// Users offered by the acting-as selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "users", rename_all = "snake_case")]
pub enum UserDirectory {
    Available(Vec<UserSummary>),
    /// Selector hidden; only the caller's own data is reachable
    OwnOnly,
}

impl UserDirectory {
    pub fn users(&self) -> &[UserSummary] {
        match self {
            UserDirectory::Available(users) => users,
            UserDirectory::OwnOnly => &[],
        }
    }

    pub fn can_select(&self) -> bool {
        matches!(self, UserDirectory::Available(_))
    }
}

/// Response of `GET /api/scope`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeView {
    pub user: SessionUser,
    pub elevated: bool,
    pub effective_target: Uuid,
    pub scope: RecordScope,
    pub directory: UserDirectory,
}
