//! Request-side context shared by every REST handler

use axum::http::HeaderMap;
use crate::core::error::{EntityError, LedgerResult, ValidationError};
use crate::core::{
    AuthContext, AuthPolicy, AuthProvider, Data, EntityFetcher, ListFilter, QueryParams,
    SessionUser,
};
use crate::scope::{RecordScope, ScopeResolver};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Authentication, scoping and cross-record lookups for handlers
pub struct ApiContext {
    auth: Arc<dyn AuthProvider>,
    resolver: ScopeResolver,

    /// Keyed by singular entity name (e.g. `inventory_item`)
    fetchers: HashMap<&'static str, Arc<dyn EntityFetcher>>,
}

impl ApiContext {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        resolver: ScopeResolver,
        fetchers: HashMap<&'static str, Arc<dyn EntityFetcher>>,
    ) -> Self {
        Self {
            auth,
            resolver,
            fetchers,
        }
    }

    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Extract the caller and enforce `policy`
    pub async fn authorize(
        &self,
        policy: &AuthPolicy,
        headers: &HeaderMap,
    ) -> LedgerResult<AuthContext> {
        let context = self.auth.extract_context(headers).await?;
        policy.enforce(&context)?;
        Ok(context)
    }

    /// The signed-in caller; anonymous requests are rejected with 401
    pub async fn caller(&self, headers: &HeaderMap) -> LedgerResult<SessionUser> {
        self.auth.extract_context(headers).await?.into_user()
    }

    /// Scope of a list query
    ///
    /// `userId` is only parsed for elevated callers. Anyone else is scoped
    /// to their own records whatever they ask for. Anonymous callers only
    /// get here through a public policy and see everything.
    pub fn record_scope(
        &self,
        context: &AuthContext,
        params: &QueryParams,
    ) -> LedgerResult<RecordScope> {
        let Some(user) = context.user() else {
            return Ok(RecordScope::All);
        };
        if self.resolver.is_elevated(user.role) {
            Ok(self.resolver.record_scope(user, params.user_id()?))
        } else {
            Ok(RecordScope::User(user.id))
        }
    }

    pub fn list_filter(
        &self,
        context: &AuthContext,
        params: &QueryParams,
    ) -> LedgerResult<ListFilter> {
        Ok(ListFilter::scoped(self.record_scope(context, params)?)
            .with_project(params.project_id()?)
            .with_invoice(params.invoice_id()?)
            .with_fields(params.filter_fields()?))
    }

    /// Fail with a field error for the first reference that does not resolve
    ///
    /// Reference types without a registered fetcher are not checked.
    pub async fn check_references<T: Data>(&self, record: &T) -> LedgerResult<()> {
        for reference in record.references() {
            let Some(fetcher) = self.fetchers.get(reference.entity_type) else {
                continue;
            };
            if !fetcher.exists(&reference.id).await? {
                return Err(ValidationError::FieldError {
                    field: reference.field.clone(),
                    message: format!(
                        "{} '{}' does not exist",
                        reference.entity_type, reference.id
                    ),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Serialize `record` and embed the requested references
    ///
    /// To-one references become an object (or `null` once the target is
    /// gone), to-many references an array of the targets still present.
    /// Names matching no reference on this record are ignored.
    pub async fn resolve_includes<T: Data>(
        &self,
        record: &T,
        includes: &[&str],
    ) -> LedgerResult<Value> {
        let mut value = serde_json::to_value(record).map_err(|e| EntityError::SerializationError {
            entity_type: T::resource_name_singular().to_string(),
            message: e.to_string(),
        })?;
        if includes.is_empty() {
            return Ok(value);
        }

        let references = record.references();
        let mut embedded = serde_json::Map::new();

        for name in includes {
            let matching: Vec<_> = references.iter().filter(|r| r.include_as == *name).collect();
            let Some(first) = matching.first() else {
                continue;
            };
            let Some(fetcher) = self.fetchers.get(first.entity_type) else {
                continue;
            };

            if first.many {
                let mut targets = Vec::with_capacity(matching.len());
                for reference in &matching {
                    if let Some(target) = fetcher.fetch_as_json(&reference.id).await? {
                        targets.push(target);
                    }
                }
                embedded.insert(name.to_string(), Value::Array(targets));
            } else {
                let target = fetcher.fetch_as_json(&first.id).await?;
                embedded.insert(name.to_string(), target.unwrap_or(Value::Null));
            }
        }

        if let Value::Object(map) = &mut value {
            map.extend(embedded);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::Role;
    use crate::core::{DataService, ServiceFetcher};
    use crate::entities::{Invoice, Project};
    use crate::storage::InMemoryDataService;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct FixedAuth(AuthContext);

    #[async_trait]
    impl AuthProvider for FixedAuth {
        async fn extract_context(&self, _headers: &HeaderMap) -> LedgerResult<AuthContext> {
            Ok(self.0.clone())
        }
    }

    fn invoice_for(project_id: Uuid) -> Invoice {
        serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "invoiceNumber": "INV-1",
            "projectId": project_id,
            "client": "Acme",
            "amount": 100.0,
            "status": "Pending",
            "dueDate": "2026-01-31",
            "createdBy": Uuid::new_v4(),
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    async fn context_with_project(project: Option<Project>) -> ApiContext {
        let projects: Arc<dyn DataService<Project>> = Arc::new(InMemoryDataService::new());
        if let Some(p) = project {
            projects.create(p).await.unwrap();
        }
        let mut fetchers: HashMap<&'static str, Arc<dyn EntityFetcher>> = HashMap::new();
        fetchers.insert("project", Arc::new(ServiceFetcher::new(projects)));
        ApiContext::new(
            Arc::new(FixedAuth(AuthContext::Anonymous)),
            ScopeResolver::default(),
            fetchers,
        )
    }

    #[tokio::test]
    async fn test_authorize_verdicts() {
        let ctx = ApiContext::new(
            Arc::new(FixedAuth(AuthContext::Anonymous)),
            ScopeResolver::default(),
            HashMap::new(),
        );
        let headers = HeaderMap::new();

        assert!(ctx.authorize(&AuthPolicy::Public, &headers).await.is_ok());
        let err = ctx.authorize(&AuthPolicy::Authenticated, &headers).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);

        let ctx = ApiContext::new(
            Arc::new(FixedAuth(AuthContext::User(SessionUser::new(
                Uuid::new_v4(),
                Role::Engineer,
            )))),
            ScopeResolver::default(),
            HashMap::new(),
        );
        let err = ctx
            .authorize(&AuthPolicy::HasRole(vec![Role::Admin]), &headers)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_record_scope_ignores_user_id_for_non_elevated() {
        let ctx = ApiContext::new(
            Arc::new(FixedAuth(AuthContext::Anonymous)),
            ScopeResolver::default(),
            HashMap::new(),
        );
        let me = SessionUser::new(Uuid::new_v4(), Role::Employee);
        let params = QueryParams {
            user_id: Some("not-a-uuid".into()),
            ..Default::default()
        };

        let scope = ctx
            .record_scope(&AuthContext::User(me.clone()), &params)
            .unwrap();
        assert_eq!(scope, RecordScope::User(me.id));

        let admin = SessionUser::new(Uuid::new_v4(), Role::Admin);
        assert!(ctx.record_scope(&AuthContext::User(admin), &params).is_err());
    }

    #[tokio::test]
    async fn test_check_references() {
        let project = Project::new("Tower A");
        let ctx = context_with_project(Some(project.clone())).await;

        assert!(ctx.check_references(&invoice_for(project.id)).await.is_ok());

        let err = ctx
            .check_references(&invoice_for(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("projectId"));
    }

    #[tokio::test]
    async fn test_resolve_includes() {
        let project = Project::new("Tower A");
        let ctx = context_with_project(Some(project.clone())).await;
        let invoice = invoice_for(project.id);

        let plain = ctx.resolve_includes(&invoice, &[]).await.unwrap();
        assert!(plain.get("project").is_none());

        let value = ctx
            .resolve_includes(&invoice, &["project", "unknown"])
            .await
            .unwrap();
        assert_eq!(value["project"]["name"], "Tower A");
        assert!(value.get("unknown").is_none());

        let dangling = ctx
            .resolve_includes(&invoice_for(Uuid::new_v4()), &["project"])
            .await
            .unwrap();
        assert!(dangling["project"].is_null());
    }
}
