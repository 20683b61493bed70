//! The set of data services backing the REST routes

use crate::config::SeedUser;
use crate::core::error::LedgerResult;
use crate::core::{DataService, EntityFetcher, ListFilter, ServiceFetcher};
use crate::entities::{Boq, InventoryItem, Invoice, MaterialRequest, Payment, Project, User};
use crate::storage::InMemoryDataService;
use std::collections::HashMap;
use std::sync::Arc;

/// One data service per record type
#[derive(Clone)]
pub struct ServiceSet {
    pub users: Arc<dyn DataService<User>>,
    pub projects: Arc<dyn DataService<Project>>,
    pub invoices: Arc<dyn DataService<Invoice>>,
    pub payments: Arc<dyn DataService<Payment>>,
    pub inventory_items: Arc<dyn DataService<InventoryItem>>,
    pub material_requests: Arc<dyn DataService<MaterialRequest>>,
    pub boqs: Arc<dyn DataService<Boq>>,
}

impl ServiceSet {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryDataService::<User>::new()),
            projects: Arc::new(InMemoryDataService::<Project>::new()),
            invoices: Arc::new(InMemoryDataService::<Invoice>::new()),
            payments: Arc::new(InMemoryDataService::<Payment>::new()),
            inventory_items: Arc::new(InMemoryDataService::<InventoryItem>::new()),
            material_requests: Arc::new(InMemoryDataService::<MaterialRequest>::new()),
            boqs: Arc::new(InMemoryDataService::<Boq>::new()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        use crate::storage::PostgresDataService;

        Self {
            users: Arc::new(PostgresDataService::<User>::new(pool.clone())),
            projects: Arc::new(PostgresDataService::<Project>::new(pool.clone())),
            invoices: Arc::new(PostgresDataService::<Invoice>::new(pool.clone())),
            payments: Arc::new(PostgresDataService::<Payment>::new(pool.clone())),
            inventory_items: Arc::new(PostgresDataService::<InventoryItem>::new(pool.clone())),
            material_requests: Arc::new(PostgresDataService::<MaterialRequest>::new(pool.clone())),
            boqs: Arc::new(PostgresDataService::<Boq>::new(pool)),
        }
    }

    /// Fetchers keyed by singular entity name, used for reference checks and includes
    pub fn fetchers(&self) -> HashMap<&'static str, Arc<dyn EntityFetcher>> {
        let mut fetchers: HashMap<&'static str, Arc<dyn EntityFetcher>> = HashMap::new();
        fetchers.insert("user", Arc::new(ServiceFetcher::new(self.users.clone())));
        fetchers.insert("project", Arc::new(ServiceFetcher::new(self.projects.clone())));
        fetchers.insert("invoice", Arc::new(ServiceFetcher::new(self.invoices.clone())));
        fetchers.insert("payment", Arc::new(ServiceFetcher::new(self.payments.clone())));
        fetchers.insert(
            "inventory_item",
            Arc::new(ServiceFetcher::new(self.inventory_items.clone())),
        );
        fetchers.insert(
            "material_request",
            Arc::new(ServiceFetcher::new(self.material_requests.clone())),
        );
        fetchers.insert("boq", Arc::new(ServiceFetcher::new(self.boqs.clone())));
        fetchers
    }

    /// Create the configured seed users that are not there yet
    ///
    /// A seed is skipped when its id, or its email, is already taken.
    /// Returns how many users were created.
    pub async fn seed_users(&self, seeds: &[SeedUser]) -> LedgerResult<usize> {
        let existing = self.users.list(&ListFilter::all()).await?;
        let mut created = 0;

        for seed in seeds {
            if let Some(id) = seed.id {
                if self.users.get(&id).await?.is_some() {
                    continue;
                }
            }
            if existing
                .iter()
                .any(|u| u.email.eq_ignore_ascii_case(&seed.email))
            {
                continue;
            }

            let mut user = User::new(seed.name.clone(), seed.email.clone(), seed.role);
            if let Some(id) = seed.id {
                user.id = id;
            }
            self.users.create(user).await?;
            tracing::info!(email = %seed.email, role = %seed.role, "seeded user");
            created += 1;
        }

        Ok(created)
    }
}
