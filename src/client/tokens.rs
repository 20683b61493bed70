//! Bearer token storage with a backup slot

use std::sync::{PoisonError, RwLock};

/// Holds the primary token and a backup copy
///
/// [`current`](Self::current) falls back to the backup when the primary is
/// missing, so a cleared primary does not sign the client out.
#[derive(Debug, Default)]
pub struct TokenStore {
    primary: RwLock<Option<String>>,
    backup: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `token` in both slots
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        *self.backup.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        *self.primary.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Drop only the primary token
    pub fn clear_primary(&self) {
        *self.primary.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Drop both tokens
    pub fn clear(&self) {
        self.clear_primary();
        *self.backup.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The token to send, primary first
    pub fn current(&self) -> Option<String> {
        let primary = self
            .primary
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if primary.is_some() {
            return primary;
        }

        let backup = self
            .backup
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if backup.is_some() {
            tracing::debug!("primary token missing, using backup");
        }
        backup
    }
}
