//! Authorization for SiteLedger
//!
//! Authentication is delegated to an [`AuthProvider`] that turns request
//! headers into an [`AuthContext`]. Routes carry an [`AuthPolicy`]; the
//! handler only consumes the verdict.

use crate::core::error::{LedgerResult, RequestError};
use crate::core::token::TokenSigner;
use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Roles known to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    /// Managing director
    Md,
    Manager,
    Accountant,
    Engineer,
    Employee,
    Client,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Md,
        Role::Manager,
        Role::Accountant,
        Role::Engineer,
        Role::Employee,
        Role::Client,
    ];

    /// Roles allowed to view other users' data unless configured otherwise
    pub const DEFAULT_ELEVATED: [Role; 2] = [Role::Admin, Role::Md];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Md => "md",
            Role::Manager => "manager",
            Role::Accountant => "accountant",
            Role::Engineer => "engineer",
            Role::Employee => "employee",
            Role::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| format!("unknown role '{}'", s))
    }
}

/// The signed-in user as far as authorization and scoping care
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SessionUser {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self {
            id,
            role,
            name: None,
        }
    }
}

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// Authenticated user
    User(SessionUser),

    /// No credentials were presented
    Anonymous,
}

impl AuthContext {
    /// Get the user if authenticated
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            AuthContext::User(user) => Some(user),
            AuthContext::Anonymous => None,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user().map(|u| u.id)
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    /// Require an authenticated user
    pub fn into_user(self) -> LedgerResult<SessionUser> {
        match self {
            AuthContext::User(user) => Ok(user),
            AuthContext::Anonymous => Err(RequestError::Unauthorized {
                message: "authentication required".to_string(),
            }
            .into()),
        }
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated user
    Authenticated,

    /// User must have one of these roles
    HasRole(Vec<Role>),
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !matches!(context, AuthContext::Anonymous),

            AuthPolicy::HasRole(required) => context.role().is_some_and(|r| required.contains(&r)),
        }
    }

    /// Turn a policy check into a verdict the handler can propagate
    ///
    /// Anonymous callers get 401, authenticated callers that fail get 403.
    pub fn enforce(&self, context: &AuthContext) -> LedgerResult<()> {
        if self.check(context) {
            return Ok(());
        }
        match context {
            AuthContext::Anonymous => Err(RequestError::Unauthorized {
                message: "authentication required".to_string(),
            }
            .into()),
            AuthContext::User(user) => Err(RequestError::Forbidden {
                message: format!("role '{}' is not allowed to perform this operation", user.role),
            }
            .into()),
        }
    }

    /// Parse policy from a config string
    ///
    /// Accepted forms: `public`, `authenticated`, `elevated`, `role:a,b`.
    /// `elevated` expands to `elevated_roles`.
    pub fn parse_policy(s: &str, elevated_roles: &[Role]) -> Result<Self, String> {
        match s.trim() {
            "public" => Ok(AuthPolicy::Public),
            "authenticated" => Ok(AuthPolicy::Authenticated),
            "elevated" => Ok(AuthPolicy::HasRole(elevated_roles.to_vec())),
            other => {
                let Some(list) = other.strip_prefix("role:") else {
                    return Err(format!("unknown policy '{}'", other));
                };
                let roles = list
                    .split(',')
                    .filter(|r| !r.trim().is_empty())
                    .map(Role::from_str)
                    .collect::<Result<Vec<_>, _>>()?;
                if roles.is_empty() {
                    return Err(format!("policy '{}' names no roles", other));
                }
                Ok(AuthPolicy::HasRole(roles))
            }
        }
    }
}

/// Policies for the five CRUD operations of one record type
#[derive(Debug, Clone)]
pub struct EntityPolicies {
    pub list: AuthPolicy,
    pub get: AuthPolicy,
    pub create: AuthPolicy,
    pub update: AuthPolicy,
    pub delete: AuthPolicy,
}

impl Default for EntityPolicies {
    /// Any signed-in user may read and write; only elevated roles delete
    fn default() -> Self {
        Self {
            list: AuthPolicy::Authenticated,
            get: AuthPolicy::Authenticated,
            create: AuthPolicy::Authenticated,
            update: AuthPolicy::Authenticated,
            delete: AuthPolicy::HasRole(Role::DEFAULT_ELEVATED.to_vec()),
        }
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from request headers
    ///
    /// Absent credentials yield [`AuthContext::Anonymous`]; credentials that
    /// are present but invalid are an error.
    async fn extract_context(&self, headers: &HeaderMap) -> LedgerResult<AuthContext>;
}

/// Verifies `Authorization: Bearer <token>` HS256 tokens
#[derive(Debug, Clone)]
pub struct JwtAuthProvider {
    signer: TokenSigner,
}

impl JwtAuthProvider {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            signer: TokenSigner::new(secret),
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> LedgerResult<AuthContext> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(AuthContext::Anonymous);
        };

        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RequestError::Unauthorized {
                message: "expected 'Authorization: Bearer <token>'".to_string(),
            })?;

        let now = chrono::Utc::now().timestamp();
        let claims = self.signer.verify(token, now).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            RequestError::Unauthorized {
                message: e.to_string(),
            }
        })?;

        Ok(AuthContext::User(SessionUser {
            id: claims.sub,
            role: claims.role,
            name: claims.name,
        }))
    }
}
