//! Client-side session state
//!
//! Holds the signed-in user and the acting-as selection. Every change is
//! published on a `tokio::sync::watch` channel so scoped views can refetch.
//!
//! # Usage
//!
//! ```rust,ignore
//! let session = SessionStore::new(ScopeResolver::default());
//! session.sign_in(user);
//!
//! let mut changes = session.subscribe();
//! session.select_target(Some(other_user));
//!
//! changes.changed().await?;
//! let ticket = session.begin_fetch();
//! let data = fetch(session.record_scope()).await;
//! if session.is_current(ticket) {
//!     render(data);
//! }
//! ```

use crate::core::auth::SessionUser;
use crate::scope::{RecordScope, ScopeResolver};
use tokio::sync::watch;
use uuid::Uuid;

/// Snapshot of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    pub selected: Option<Uuid>,
    /// Bumped on every sign-in, selection change and logout
    pub generation: u64,
}

/// Captured when a fetch is issued. A response is applied only while its
/// ticket is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The signed-in user and acting-as selection for one client session
pub struct SessionStore {
    resolver: ScopeResolver,
    state: watch::Sender<SessionState>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl SessionStore {
    pub fn new(resolver: ScopeResolver) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { resolver, state }
    }

    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Start a session for `user`, dropping any previous selection
    pub fn sign_in(&self, user: SessionUser) {
        tracing::debug!(user_id = %user.id, role = %user.role, "session started");
        self.state.send_modify(|s| {
            s.user = Some(user);
            s.selected = None;
            s.generation += 1;
        });
    }

    /// Select the user to act as. `None` resets to self.
    ///
    /// Returns whether the stored selection changed; subscribers are only
    /// notified when it did.
    pub fn select_target(&self, target: Option<Uuid>) -> bool {
        self.state.send_if_modified(|s| {
            if s.selected == target {
                return false;
            }
            s.selected = target;
            s.generation += 1;
            true
        })
    }

    pub fn clear_selection(&self) -> bool {
        self.select_target(None)
    }

    /// Tear the session down and notify subscribers
    pub fn logout(&self) {
        self.state.send_modify(|s| {
            s.user = None;
            s.selected = None;
            s.generation += 1;
        });
        tracing::debug!("session ended");
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().user.clone()
    }

    /// The stored selection, as set, before role rules apply
    pub fn selected(&self) -> Option<Uuid> {
        self.state.borrow().selected
    }

    /// `None` when nobody is signed in
    pub fn effective_target(&self) -> Option<Uuid> {
        let state = self.state.borrow();
        state
            .user
            .as_ref()
            .map(|u| self.resolver.effective_target(u, state.selected))
    }

    /// `None` when nobody is signed in
    pub fn record_scope(&self) -> Option<RecordScope> {
        let state = self.state.borrow();
        state
            .user
            .as_ref()
            .map(|u| self.resolver.record_scope(u, state.selected))
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket {
            generation: self.state.borrow().generation,
        }
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.state.borrow().generation == ticket.generation
    }
}
