//! SiteLedger server
//!
//! Usage: `siteledger [config.yaml]`
//!
//! The config path may also come from `SITELEDGER_CONFIG`. Without one, the
//! defaults apply and `SITELEDGER_JWT_SECRET` must be set.

use anyhow::{Context, Result};
use siteledger::config::{AppConfig, CONFIG_ENV, StorageBackend};
use siteledger::server::{ServerBuilder, ServiceSet};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok());

    let mut config = AppConfig::load(path.as_deref()).context("failed to load configuration")?;
    config.apply_env();
    config.validate().context("invalid configuration")?;

    let services = build_services(&config).await?;
    let seeded = services.seed_users(&config.seed.users).await?;
    if seeded > 0 {
        tracing::info!(count = seeded, "seed users created");
    }

    tracing::info!(
        backend = ?config.storage.backend,
        elevated = ?config.auth.elevated_roles,
        "starting siteledger v{}",
        env!("CARGO_PKG_VERSION")
    );

    ServerBuilder::new(config)
        .with_services(services)
        .serve()
        .await
}

async fn build_services(config: &AppConfig) -> Result<ServiceSet> {
    match config.storage.backend {
        StorageBackend::InMemory => Ok(ServiceSet::in_memory()),
        StorageBackend::Postgres => postgres_services(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn postgres_services(config: &AppConfig) -> Result<ServiceSet> {
    let url = config
        .storage
        .database_url
        .as_deref()
        .context("storage.database_url is required by the postgres backend")?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    siteledger::storage::ensure_schema(&pool).await?;

    Ok(ServiceSet::postgres(pool))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_services(_config: &AppConfig) -> Result<ServiceSet> {
    anyhow::bail!(
        "storage.backend is postgres but this binary was built without the `postgres` feature"
    )
}
