//! Configuration loading and management
//!
//! Configuration comes from a YAML file, then environment overrides:
//!
//! ```yaml
//! server:
//!   bind: 0.0.0.0:3000
//!   cors_origins: ["http://localhost:5173"]
//! auth:
//!   jwt_secret: change-me
//!   elevated_roles: [admin, md]
//!   self_selection: own_records
//! storage:
//!   backend: in_memory
//! policies:
//!   invoices:
//!     delete: role:admin,accountant
//! seed:
//!   users:
//!     - name: Site Admin
//!       email: admin@example.com
//!       role: admin
//! ```

use crate::core::auth::{AuthPolicy, EntityPolicies, Role};
use crate::core::error::{ConfigError, LedgerResult};
use crate::scope::{ScopeResolver, SelfSelectionPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use uuid::Uuid;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "SITELEDGER_CONFIG";
pub const BIND_ENV: &str = "SITELEDGER_BIND";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const JWT_SECRET_ENV: &str = "SITELEDGER_JWT_SECRET";

/// Record types that accept a `policies` entry
pub const POLICY_ENTITIES: &[&str] = &[
    "users",
    "projects",
    "invoices",
    "payments",
    "inventory_items",
    "material_requests",
    "boqs",
];

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,

    /// Per-entity policy overrides, keyed by entity (e.g. `inventory_items`)
    pub policies: HashMap<String, PolicyOverrides>,

    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,

    /// Browser origins allowed by CORS. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,

    /// Roles that may act as another user
    pub elevated_roles: Vec<Role>,

    pub self_selection: SelfSelectionPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            elevated_roles: Role::DEFAULT_ELEVATED.to_vec(),
            self_selection: SelfSelectionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
}

/// Policy strings for one entity's operations
///
/// Each value is `public`, `authenticated`, `elevated` or `role:a,b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAuthConfig {
    pub list: String,
    pub get: String,
    pub create: String,
    pub update: String,
    pub delete: String,
}

/// A `policies` entry; omitted operations keep the entity's default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyOverrides {
    pub list: Option<String>,
    pub get: Option<String>,
    pub create: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
}

impl PolicyOverrides {
    pub fn apply_to(&self, base: EntityAuthConfig) -> EntityAuthConfig {
        let pick = |over: &Option<String>, default: String| over.clone().unwrap_or(default);
        EntityAuthConfig {
            list: pick(&self.list, base.list),
            get: pick(&self.get, base.get),
            create: pick(&self.create, base.create),
            update: pick(&self.update, base.update),
            delete: pick(&self.delete, base.delete),
        }
    }
}

fn authenticated() -> String {
    "authenticated".to_string()
}

fn elevated() -> String {
    "elevated".to_string()
}

impl Default for EntityAuthConfig {
    fn default() -> Self {
        Self {
            list: authenticated(),
            get: authenticated(),
            create: authenticated(),
            update: authenticated(),
            delete: elevated(),
        }
    }
}

impl EntityAuthConfig {
    /// User administration is reserved to elevated roles, except reading one user
    pub fn users_default() -> Self {
        Self {
            list: elevated(),
            get: authenticated(),
            create: elevated(),
            update: elevated(),
            delete: elevated(),
        }
    }

    /// Built-in policies of `entity` before any override
    pub fn default_for(entity: &str) -> Self {
        if normalize_entity(entity) == "users" {
            Self::users_default()
        } else {
            Self::default()
        }
    }

    pub fn to_policies(&self, elevated_roles: &[Role]) -> Result<EntityPolicies, String> {
        Ok(EntityPolicies {
            list: AuthPolicy::parse_policy(&self.list, elevated_roles)?,
            get: AuthPolicy::parse_policy(&self.get, elevated_roles)?,
            create: AuthPolicy::parse_policy(&self.create, elevated_roles)?,
            update: AuthPolicy::parse_policy(&self.update, elevated_roles)?,
            delete: AuthPolicy::parse_policy(&self.delete, elevated_roles)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Users created at startup when the backing store has no user with the same id
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    /// Fixed id so issued tokens stay valid across restarts
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AppConfig {
    /// Load configuration from an optional YAML file
    ///
    /// No path, or a path that does not exist, yields the defaults.
    pub fn load(path: Option<&str>) -> LedgerResult<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) if !Path::new(p).exists() => {
                tracing::warn!(path = p, "config file not found, using defaults");
                Ok(Self::default())
            }
            Some(p) => Self::from_yaml_file(p),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> LedgerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> LedgerResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; empty values are ignored
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get(BIND_ENV) {
            self.server.bind = bind;
        }
        if let Some(url) = get(DATABASE_URL_ENV) {
            self.storage.database_url = Some(url);
        }
        if let Some(secret) = get(JWT_SECRET_ENV) {
            self.auth.jwt_secret = secret;
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> LedgerResult<()> {
        self.bind_addr()?;

        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.jwt_secret".to_string(),
                value: String::new(),
                message: format!("must be set (or provide {})", JWT_SECRET_ENV),
            }
            .into());
        }

        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "storage.database_url".to_string(),
                value: String::new(),
                message: format!(
                    "required by the postgres backend (or provide {})",
                    DATABASE_URL_ENV
                ),
            }
            .into());
        }

        for entity in self.policies.keys() {
            let key = normalize_entity(entity);
            if !POLICY_ENTITIES.contains(&key.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "policies".to_string(),
                    value: entity.clone(),
                    message: format!(
                        "unknown entity, expected one of {}",
                        POLICY_ENTITIES.join(", ")
                    ),
                }
                .into());
            }
            let auth = self.policy_for(&key);
            auth.to_policies(&self.auth.elevated_roles)
                .map_err(|message| ConfigError::InvalidValue {
                    field: format!("policies.{}", entity),
                    value: format!("{:?}", auth),
                    message,
                })?;
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> LedgerResult<SocketAddr> {
        self.server.bind.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::InvalidValue {
                field: "server.bind".to_string(),
                value: self.server.bind.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Policy strings for `entity` (`inventory-items` and `inventory_items` both work)
    pub fn policy_for(&self, entity: &str) -> EntityAuthConfig {
        let key = normalize_entity(entity);
        let base = EntityAuthConfig::default_for(&key);
        match self.policies.iter().find(|(k, _)| normalize_entity(k) == key) {
            Some((_, overrides)) => overrides.apply_to(base),
            None => base,
        }
    }

    /// Parsed policies for `entity`
    pub fn entity_policies(&self, entity: &str) -> LedgerResult<EntityPolicies> {
        let auth = self.policy_for(entity);
        auth.to_policies(&self.auth.elevated_roles).map_err(|message| {
            ConfigError::InvalidValue {
                field: format!("policies.{}", normalize_entity(entity)),
                value: format!("{:?}", auth),
                message,
            }
            .into()
        })
    }

    pub fn resolver(&self) -> ScopeResolver {
        ScopeResolver::new(self.auth.elevated_roles.clone(), self.auth.self_selection)
    }
}

fn normalize_entity(name: &str) -> String {
    name.trim().replace('-', "_").to_ascii_lowercase()
}
