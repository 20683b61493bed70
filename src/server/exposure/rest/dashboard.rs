//! Dashboard endpoints: BOQ statistics, invoice summary and the scope selector

use crate::core::error::LedgerResult;
use crate::core::{AuthPolicy, ListFilter, QueryParams};
use crate::scope::{ScopeView, UserDirectory};
use crate::server::context::ApiContext;
use crate::server::services::ServiceSet;
use crate::stats::{BoqStats, InvoiceSummary};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardState {
    pub context: Arc<ApiContext>,
    pub services: ServiceSet,

    /// Stats reuse the list policy of the records they aggregate
    pub boq_policy: Arc<AuthPolicy>,
    pub invoice_policy: Arc<AuthPolicy>,
}

pub fn routes(state: DashboardState) -> Router {
    Router::new()
        .route("/boqs/stats", get(boq_stats))
        .route("/invoices/summary", get(invoice_summary))
        .route("/scope", get(scope))
        .with_state(state)
}

/// `GET /api/boqs/stats[?userId=]`
pub async fn boq_stats(
    State(state): State<DashboardState>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> LedgerResult<Json<BoqStats>> {
    let auth = state.context.authorize(&state.boq_policy, &headers).await?;
    let scope = state.context.record_scope(&auth, &params)?;

    let boqs = state.services.boqs.list(&ListFilter::scoped(scope)).await?;
    Ok(Json(BoqStats::compute(&boqs, Utc::now())))
}

/// `GET /api/invoices/summary[?userId=]`
pub async fn invoice_summary(
    State(state): State<DashboardState>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> LedgerResult<Json<InvoiceSummary>> {
    let auth = state.context.authorize(&state.invoice_policy, &headers).await?;
    let scope = state.context.record_scope(&auth, &params)?;

    let invoices = state
        .services
        .invoices
        .list(&ListFilter::scoped(scope))
        .await?;
    Ok(Json(InvoiceSummary::compute(&invoices)))
}

/// `GET /api/scope[?userId=]`
///
/// The selectable users are only loaded for elevated callers; a failed load
/// hides the selector rather than failing the request.
pub async fn scope(
    State(state): State<DashboardState>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> LedgerResult<Json<ScopeView>> {
    let user = state.context.caller(&headers).await?;
    let resolver = state.context.resolver();
    let elevated = resolver.is_elevated(user.role);

    let selected = if elevated { params.user_id()? } else { None };
    let users = state.services.users.clone();
    let directory: UserDirectory = resolver
        .load_directory(&user, || async move {
            users
                .list(&ListFilter::all())
                .await
                .map(|all| all.iter().map(|u| u.summary()).collect())
        })
        .await;

    Ok(Json(ScopeView {
        effective_target: resolver.effective_target(&user, selected),
        scope: resolver.record_scope(&user, selected),
        elevated,
        directory,
        user,
    }))
}
