//! Service wiring: one store handle per collection, shared by every request.
//!
//! Storage is picked by configuration (`USE_PERSISTENT_STORES`): in-memory
//! maps for dev/tests, or a Postgres pool holding `JSONB` documents.

use std::sync::Arc;

use soil_auth::{Hs256Jwt, PasswordHasher, UserAccount};
use soil_financial::FinancialTransaction;
use soil_infra::document_store::postgres;
use soil_infra::{
    AppConfig, DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, StorageConfig,
    StoreError,
};
use soil_purchasing::PurchaseRequest;
use soil_sales::Sale;

pub mod financial;
pub mod identity;
pub mod purchasing;
pub mod records;
pub mod sales;

pub use financial::FinancialService;
pub use identity::{IdentityService, TokenService};
pub use purchasing::PurchaseRequestService;
pub use records::{Records, Resource};
pub use sales::SalesService;

/// Store handles for every collection.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn DocumentStore<UserAccount>>,
    pub financial: Arc<dyn DocumentStore<FinancialTransaction>>,
    pub sales: Arc<dyn DocumentStore<Sale>>,
    pub purchase_requests: Arc<dyn DocumentStore<PurchaseRequest>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryDocumentStore::<UserAccount>::new().with_unique_field("email")),
            financial: Arc::new(InMemoryDocumentStore::<FinancialTransaction>::new()),
            sales: Arc::new(InMemoryDocumentStore::<Sale>::new()),
            purchase_requests: Arc::new(InMemoryDocumentStore::<PurchaseRequest>::new()),
        }
    }

    pub async fn postgres(config: &soil_infra::DatabaseConfig) -> Result<Self, StoreError> {
        let pool = postgres::connect(config).await?;
        postgres::ensure_schema(&pool).await?;
        let pool = Arc::new(pool);

        let users = PostgresDocumentStore::<UserAccount>::new(Arc::clone(&pool));
        users.ensure_unique_field("email").await?;

        Ok(Self {
            users: Arc::new(users),
            financial: Arc::new(PostgresDocumentStore::<FinancialTransaction>::new(Arc::clone(&pool))),
            sales: Arc::new(PostgresDocumentStore::<Sale>::new(Arc::clone(&pool))),
            purchase_requests: Arc::new(PostgresDocumentStore::<PurchaseRequest>::new(pool)),
        })
    }
}

#[derive(Clone)]
pub struct AppServices {
    pub identity: IdentityService,
    pub financial: FinancialService,
    pub sales: SalesService,
    pub purchasing: PurchaseRequestService,
}

impl AppServices {
    pub fn new(stores: Stores, tokens: Arc<dyn TokenService>, hasher: PasswordHasher) -> Self {
        Self {
            identity: IdentityService::new(stores.users, hasher, tokens),
            financial: FinancialService::new(Records::new(stores.financial)),
            sales: SalesService::new(Records::new(stores.sales)),
            purchasing: PurchaseRequestService::new(Records::new(stores.purchase_requests)),
        }
    }
}

/// Build services from configuration, connecting to Postgres when configured.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    let stores = match &config.storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory stores");
            Stores::in_memory()
        }
        StorageConfig::Postgres(db) => {
            tracing::info!(max_connections = db.max_connections, "using postgres stores");
            Stores::postgres(db).await?
        }
    };

    let tokens = Hs256Jwt::new(
        config.jwt.secret.as_bytes(),
        config.jwt.issuer.clone(),
        config.jwt.audience.clone(),
        chrono::Duration::hours(config.jwt.ttl_hours),
    );

    Ok(AppServices::new(
        stores,
        Arc::new(tokens),
        PasswordHasher::new(config.bcrypt_cost),
    ))
}
