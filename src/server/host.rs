//! Server host holding all application state
//!
//! The host is the single source of truth the REST exposure reads from:
//! configuration, the request context, the data services and the registered
//! entity routes.

use crate::config::AppConfig;
use crate::core::AuthProvider;
use crate::core::error::LedgerResult;
use crate::entities::{Boq, InventoryItem, Invoice, MaterialRequest, Payment, Project, User};
use crate::server::context::ApiContext;
use crate::server::entity_registry::{CrudDescriptor, EntityRegistry};
use crate::server::services::ServiceSet;
use std::sync::Arc;

pub struct ServerHost {
    pub config: Arc<AppConfig>,
    pub context: Arc<ApiContext>,
    pub services: ServiceSet,
    pub entity_registry: EntityRegistry,
}

impl ServerHost {
    /// Wire the services into a context and register one descriptor per record type
    ///
    /// Fails when a configured policy does not parse.
    pub fn from_components(
        config: AppConfig,
        auth: Arc<dyn AuthProvider>,
        services: ServiceSet,
    ) -> LedgerResult<Self> {
        let context = Arc::new(ApiContext::new(
            auth,
            config.resolver(),
            services.fetchers(),
        ));

        let mut entity_registry = EntityRegistry::new();
        entity_registry.register(Box::new(CrudDescriptor::<User>::new(
            services.users.clone(),
            config.entity_policies("users")?,
            context.clone(),
        )));
        entity_registry.register(Box::new(CrudDescriptor::<Project>::new(
            services.projects.clone(),
            config.entity_policies("projects")?,
            context.clone(),
        )));
        entity_registry.register(Box::new(CrudDescriptor::<Invoice>::new(
            services.invoices.clone(),
            config.entity_policies("invoices")?,
            context.clone(),
        )));
        entity_registry.register(Box::new(CrudDescriptor::<Payment>::new(
            services.payments.clone(),
            config.entity_policies("payments")?,
            context.clone(),
        )));
        entity_registry.register(Box::new(CrudDescriptor::<InventoryItem>::new(
            services.inventory_items.clone(),
            config.entity_policies("inventory_items")?,
            context.clone(),
        )));
        entity_registry.register(Box::new(CrudDescriptor::<MaterialRequest>::new(
            services.material_requests.clone(),
            config.entity_policies("material_requests")?,
            context.clone(),
        )));
        entity_registry.register(Box::new(CrudDescriptor::<Boq>::new(
            services.boqs.clone(),
            config.entity_policies("boqs")?,
            context.clone(),
        )));

        Ok(Self {
            config: Arc::new(config),
            context,
            services,
            entity_registry,
        })
    }

    /// Get entity types registered in the host
    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyOverrides;
    use crate::core::JwtAuthProvider;

    #[test]
    fn test_registers_every_record_type() {
        let host = ServerHost::from_components(
            AppConfig::default(),
            Arc::new(JwtAuthProvider::new("secret")),
            ServiceSet::in_memory(),
        )
        .unwrap();

        assert_eq!(
            host.entity_types(),
            vec![
                "boq",
                "inventory_item",
                "invoice",
                "material_request",
                "payment",
                "project",
                "user"
            ]
        );
    }

    #[test]
    fn test_bad_policy_is_rejected() {
        let mut config = AppConfig::default();
        config.policies.insert(
            "payments".to_string(),
            PolicyOverrides {
                create: Some("role:wizard".to_string()),
                ..Default::default()
            },
        );

        let result = ServerHost::from_components(
            config,
            Arc::new(JwtAuthProvider::new("secret")),
            ServiceSet::in_memory(),
        );
        assert!(result.is_err());
    }
}
