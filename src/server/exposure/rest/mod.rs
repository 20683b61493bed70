//! REST API exposure
//!
//! Consumes a [`ServerHost`] and produces an Axum `Router` with:
//! - `/health` and `/healthz`
//! - CRUD and CSV export routes for every registered entity, under `/api`
//! - dashboard routes under `/api`
//! - any custom routes
//!
//! Request tracing and CORS are applied to the whole router.

pub mod crud;
pub mod dashboard;

use super::super::host::ServerHost;
use crate::core::error::{ConfigError, LedgerResult};
use axum::http::{HeaderValue, Method, header};
use axum::{Json, Router, routing::get};
use dashboard::DashboardState;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> LedgerResult<Router> {
        let dashboard = DashboardState {
            context: host.context.clone(),
            services: host.services.clone(),
            boq_policy: Arc::new(host.config.entity_policies("boqs")?.list),
            invoice_policy: Arc::new(host.config.entity_policies("invoices")?.list),
        };

        let api_routes = host
            .entity_registry
            .build_routes()
            .merge(dashboard::routes(dashboard));

        let mut app = Self::health_routes().nest("/api", api_routes);

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        let cors = Self::cors_layer(&host.config.server.cors_origins)?;
        Ok(app.layer(cors).layer(TraceLayer::new_for_http()))
    }

    /// Any origin when none are configured, otherwise exactly the listed ones
    fn cors_layer(origins: &[String]) -> LedgerResult<CorsLayer> {
        let layer = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

        if origins.is_empty() {
            return Ok(layer.allow_origin(Any));
        }

        let values = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| ConfigError::InvalidValue {
                    field: "server.cors_origins".to_string(),
                    value: origin.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(layer.allow_origin(AllowOrigin::list(values)))
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "siteledger",
            "version": env!("CARGO_PKG_VERSION")
        }))
    }
}
