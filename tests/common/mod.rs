//! Shared fixtures for the integration tests

#![allow(dead_code)]

use axum::Router;
use siteledger::config::AppConfig;
use siteledger::core::{Claims, Role, TokenSigner};
use siteledger::entities::User;
use siteledger::server::{ServerBuilder, ServiceSet};

pub const SECRET: &str = "integration-secret";

/// A router over fresh in-memory services with three users
pub struct TestApp {
    pub router: Router,
    pub services: ServiceSet,
    pub admin: User,
    pub engineer: User,
    pub accountant: User,
    signer: TokenSigner,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(base_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let services = ServiceSet::in_memory();

        let admin = User::new("Asha Admin", "asha@example.com", Role::Admin);
        let engineer = User::new("Ravi Engineer", "ravi@example.com", Role::Engineer);
        let accountant = User::new("Meera Accounts", "meera@example.com", Role::Accountant);
        for user in [&admin, &engineer, &accountant] {
            services
                .users
                .create(user.clone())
                .await
                .expect("seeding a fresh store");
        }

        let router = ServerBuilder::new(config)
            .with_services(services.clone())
            .build()
            .expect("router builds");

        Self {
            router,
            services,
            admin,
            engineer,
            accountant,
            signer: TokenSigner::new(SECRET),
        }
    }

    pub fn token_for(&self, user: &User) -> String {
        self.signer
            .sign(&Claims {
                sub: user.id,
                role: user.role,
                name: Some(user.name.clone()),
                exp: chrono::Utc::now().timestamp() + 3600,
            })
            .expect("token signs")
    }

    pub fn expired_token_for(&self, user: &User) -> String {
        self.signer
            .sign(&Claims {
                sub: user.id,
                role: user.role,
                name: None,
                exp: chrono::Utc::now().timestamp() - 60,
            })
            .expect("token signs")
    }
}

pub fn base_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    config
}
