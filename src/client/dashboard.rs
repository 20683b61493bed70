//! Scoped dashboard views for a signed-in client
//!
//! Every load captures a [`FetchTicket`] before the request goes out. If the
//! selection changes while the request is in flight, the response is
//! discarded and the load returns `None`; the caller re-runs it after the
//! change notification. Failed requests are logged and degrade to an empty
//! result.

use super::api::{ApiClient, ListQuery};
use super::ClientError;
use crate::core::{Entity, SessionUser};
use crate::entities::User;
use crate::scope::{ScopeResolver, SessionStore, UserDirectory};
use crate::stats::BoqStats;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

pub struct Dashboard {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl Dashboard {
    pub fn new(api: ApiClient, resolver: ScopeResolver) -> Self {
        Self {
            api,
            session: Arc::new(SessionStore::new(resolver)),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Store the token and start the session
    pub fn sign_in(&self, user: SessionUser, token: impl Into<String>) {
        self.api.tokens().set(token);
        self.session.sign_in(user);
    }

    /// Drop the tokens and the session state
    pub fn logout(&self) {
        self.api.tokens().clear();
        self.session.logout();
    }

    /// Act as `target`, or as self with `None`
    pub fn select(&self, target: Option<Uuid>) -> bool {
        self.session.select_target(target)
    }

    /// The `userId` to send: the stored selection, for elevated users only
    fn requested_user(&self) -> Option<Uuid> {
        let user = self.session.current_user()?;
        if self.session.resolver().is_elevated(user.role) {
            self.session.selected()
        } else {
            None
        }
    }

    /// Run `fetch` for the current selection
    ///
    /// `Some(result)` while the selection is unchanged, `None` when the
    /// response went stale. Errors become `R::default()`.
    async fn scoped_fetch<R, F, Fut>(&self, what: &str, fetch: F) -> Option<R>
    where
        R: Default,
        F: FnOnce(Option<Uuid>) -> Fut,
        Fut: Future<Output = Result<R, ClientError>>,
    {
        let ticket = self.session.begin_fetch();
        let result = match fetch(self.requested_user()).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(what, error = %e, "fetch failed, showing empty result");
                R::default()
            }
        };

        if self.session.is_current(ticket) {
            Some(result)
        } else {
            tracing::debug!(what, generation = ticket.generation(), "discarding stale response");
            None
        }
    }

    /// Every record of `T` visible under the current selection, across all pages
    pub async fn records<T: Entity>(&self) -> Option<Vec<T>> {
        self.scoped_fetch(T::resource_name(), |user_id| async move {
            self.api
                .list_all::<T>(ListQuery::default().for_user(user_id))
                .await
        })
        .await
    }

    /// BOQ statistics for the current selection; `None` when stale or failed
    pub async fn boq_stats(&self) -> Option<BoqStats> {
        self.scoped_fetch("boq stats", |user_id| async move {
            self.api.boq_stats(user_id).await.map(Some)
        })
        .await
        .flatten()
    }

    /// Users the signed-in user may act as
    pub async fn directory(&self) -> UserDirectory {
        let Some(user) = self.session.current_user() else {
            return UserDirectory::OwnOnly;
        };
        self.session
            .resolver()
            .load_directory(&user, || async {
                self.api
                    .list_all::<User>(ListQuery::default())
                    .await
                    .map(|users| users.iter().map(User::summary).collect())
            })
            .await
    }
}
