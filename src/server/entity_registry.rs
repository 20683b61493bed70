//! Entity registry for managing entity descriptors and auto-generating CRUD routes

use super::context::ApiContext;
use super::exposure::rest::crud::{
    CrudState, create_record, delete_record, export_records, get_record, list_records,
    update_record,
};
use crate::core::{DataService, EntityPolicies, Record};
use axum::Router;
use axum::routing::get;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trait that describes how to build routes for an entity
///
/// Routes are relative to the API root (the REST exposure nests them
/// under `/api`).
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g., "inventory_item")
    fn entity_type(&self) -> &str;

    /// The URL plural (e.g., "inventory-items")
    fn plural(&self) -> &str;

    /// Build the routes for this entity
    fn build_routes(&self) -> Router;
}

/// The generic descriptor used for every [`Record`] type
///
/// Produces:
/// - `GET|POST /{plural}`
/// - `GET /{plural}/export.csv`
/// - `GET|PUT|DELETE /{plural}/{id}`
pub struct CrudDescriptor<T: Record> {
    state: CrudState<T>,
}

impl<T: Record> CrudDescriptor<T> {
    pub fn new(
        service: Arc<dyn DataService<T>>,
        policies: EntityPolicies,
        context: Arc<ApiContext>,
    ) -> Self {
        Self {
            state: CrudState::new(service, policies, context),
        }
    }
}

impl<T: Record> EntityDescriptor for CrudDescriptor<T> {
    fn entity_type(&self) -> &str {
        T::resource_name_singular()
    }

    fn plural(&self) -> &str {
        T::resource_name()
    }

    fn build_routes(&self) -> Router {
        let plural = T::resource_name();

        Router::new()
            .route(
                &format!("/{}", plural),
                get(list_records::<T>).post(create_record::<T>),
            )
            .route(&format!("/{}/export.csv", plural), get(export_records::<T>))
            .route(
                &format!("/{}/{{id}}", plural),
                get(get_record::<T>)
                    .put(update_record::<T>)
                    .delete(delete_record::<T>),
            )
            .with_state(self.state.clone())
    }
}

/// Registry for all entities in the application
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: BTreeMap::new(),
        }
    }

    /// Register an entity descriptor, replacing any with the same entity type
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Build a router with all registered entity routes
    pub fn build_routes(&self) -> Router {
        let mut router = Router::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes());
        }

        router
    }

    /// Get all registered entity types, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    pub fn plurals(&self) -> Vec<&str> {
        self.descriptors.values().map(|d| d.plural()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDescriptor {
        entity_type: String,
        plural: String,
    }

    impl MockDescriptor {
        fn new(entity_type: &str, plural: &str) -> Self {
            Self {
                entity_type: entity_type.to_string(),
                plural: plural.to_string(),
            }
        }
    }

    impl EntityDescriptor for MockDescriptor {
        fn entity_type(&self) -> &str {
            &self.entity_type
        }

        fn plural(&self) -> &str {
            &self.plural
        }

        fn build_routes(&self) -> Router {
            Router::new()
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = EntityRegistry::new();
        assert!(registry.entity_types().is_empty());
    }

    #[test]
    fn test_register_multiple_entities() {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(MockDescriptor::new("project", "projects")));
        registry.register(Box::new(MockDescriptor::new("inventory_item", "inventory-items")));
        registry.register(Box::new(MockDescriptor::new("boq", "boqs")));

        assert_eq!(
            registry.entity_types(),
            vec!["boq", "inventory_item", "project"]
        );
        assert_eq!(
            registry.plurals(),
            vec!["boqs", "inventory-items", "projects"]
        );
    }

    #[test]
    fn test_register_duplicate_replaces() {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(MockDescriptor::new("boq", "boqs")));
        registry.register(Box::new(MockDescriptor::new("boq", "bills")));
        assert_eq!(registry.plurals(), vec!["bills"]);
    }
}
