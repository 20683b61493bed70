//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use super::services::ServiceSet;
use crate::config::AppConfig;
use crate::core::{AuthProvider, JwtAuthProvider};
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating the HTTP server
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::load(Some("siteledger.yaml"))?;
/// ServerBuilder::new(config)
///     .with_services(ServiceSet::in_memory())
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    auth_provider: Option<Arc<dyn AuthProvider>>,
    services: Option<ServiceSet>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            auth_provider: None,
            services: None,
            custom_routes: Vec::new(),
        }
    }

    /// Replace the default bearer-token provider
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    /// Use these data services instead of fresh in-memory ones
    pub fn with_services(mut self, services: ServiceSet) -> Self {
        self.services = Some(services);
        self
    }

    /// Add routes that don't fit the CRUD pattern (login, webhooks, ...)
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the host
    ///
    /// Without an explicit provider, tokens are verified with
    /// `auth.jwt_secret`; without explicit services, storage is in memory.
    pub fn build_host(mut self) -> Result<ServerHost> {
        let auth: Arc<dyn AuthProvider> = match self.auth_provider.take() {
            Some(provider) => provider,
            None => Arc::new(JwtAuthProvider::new(self.config.auth.jwt_secret.as_bytes())),
        };
        let services = self.services.take().unwrap_or_else(ServiceSet::in_memory);

        ServerHost::from_components(self.config, auth, services)
            .context("failed to build server host")
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes).context("failed to build REST router")
    }

    /// Serve on `server.bind` until SIGTERM or Ctrl+C
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr()?;
        let app = self.build()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyOverrides;

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new(AppConfig::default())
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    #[test]
    fn test_build_host_defaults_to_in_memory() {
        let host = ServerBuilder::new(AppConfig::default())
            .build_host()
            .expect("build_host should succeed");
        assert_eq!(host.entity_types().len(), 7);
    }

    #[test]
    fn test_build_produces_router() {
        use axum::routing::get;

        let custom = Router::new().route("/custom", get(|| async { "ok" }));
        let router = ServerBuilder::new(AppConfig::default())
            .with_custom_routes(custom)
            .build();
        assert!(router.is_ok());
    }

    #[test]
    fn test_build_fails_on_bad_policy() {
        let mut config = AppConfig::default();
        config.policies.insert(
            "boqs".to_string(),
            PolicyOverrides {
                list: Some("nobody".to_string()),
                ..Default::default()
            },
        );

        let err = ServerBuilder::new(config).build().unwrap_err();
        assert!(format!("{:#}", err).contains("nobody"));
    }

    #[test]
    fn test_build_fails_on_bad_cors_origin() {
        let mut config = AppConfig::default();
        config.server.cors_origins = vec!["bad\norigin".to_string()];
        assert!(ServerBuilder::new(config).build().is_err());
    }
}
