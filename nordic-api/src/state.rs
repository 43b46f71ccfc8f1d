use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use nordic_catalog::PricingEngine;
use nordic_core::events::EventPublisher;
use nordic_core::forecast::DemandForecaster;
use nordic_core::repository::{
    AgentRepository, DistributorRepository, InventoryRepository, RetailerRepository, StockRepository,
};
use nordic_order::{BillingService, DynamicPricingService, RestockService};
use nordic_store::app_config::Config;
use nordic_store::{
    MemoryStore, RateLimiter, StoreAgentRepository, StoreDistributorRepository, StoreInventoryRepository,
    StoreRetailerRepository, StoreStockRepository,
};

use crate::middleware::resiliency::{CircuitBreaker, GuardedForecaster};

/// One handle per repository trait.
#[derive(Clone)]
pub struct Repositories {
    pub retailers: Arc<dyn RetailerRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub stock: Arc<dyn StockRepository>,
    pub agents: Arc<dyn AgentRepository>,
    pub distributors: Arc<dyn DistributorRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            retailers: Arc::new(StoreRetailerRepository::new(pool.clone())),
            inventory: Arc::new(StoreInventoryRepository::new(pool.clone())),
            stock: Arc::new(StoreStockRepository::new(pool.clone())),
            agents: Arc::new(StoreAgentRepository::new(pool.clone())),
            distributors: Arc::new(StoreDistributorRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            retailers: store.clone(),
            inventory: store.clone(),
            stock: store.clone(),
            agents: store.clone(),
            distributors: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub retailers: Arc<dyn RetailerRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub stock: Arc<dyn StockRepository>,
    pub agents: Arc<dyn AgentRepository>,
    pub distributors: Arc<dyn DistributorRepository>,
    pub forecaster: Arc<dyn DemandForecaster>,
    pub billing: Arc<BillingService>,
    pub pricing: Arc<DynamicPricingService>,
    pub restock: Arc<RestockService>,
    pub rate_limiter: Option<Arc<RateLimiter>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire services over the given repositories. The forecaster is wrapped
    /// in a circuit breaker shared by `/forecast` and dynamic pricing.
    pub fn new(
        config: Config,
        repos: Repositories,
        forecaster: Arc<dyn DemandForecaster>,
        events: Arc<dyn EventPublisher>,
        rate_limiter: Option<Arc<RateLimiter>>,
    ) -> Self {
        let breaker = CircuitBreaker::new(
            "forecast",
            config.forecast.failure_threshold,
            Duration::from_secs(config.forecast.reset_timeout_seconds),
        );
        let forecaster: Arc<dyn DemandForecaster> = Arc::new(GuardedForecaster::new(forecaster, breaker));

        let billing = BillingService::new(repos.stock.clone(), events.clone());
        let pricing = DynamicPricingService::new(
            PricingEngine::new(config.pricing.clone()),
            config.forecast.fallback_demand,
            repos.stock.clone(),
            repos.inventory.clone(),
            forecaster.clone(),
            events.clone(),
        );
        let restock = RestockService::new(repos.stock.clone(), repos.distributors.clone(), events);

        Self {
            retailers: repos.retailers,
            inventory: repos.inventory,
            stock: repos.stock,
            agents: repos.agents,
            distributors: repos.distributors,
            forecaster,
            billing: Arc::new(billing),
            pricing: Arc::new(pricing),
            restock: Arc::new(restock),
            rate_limiter,
            config: Arc::new(config),
        }
    }
}
