pub mod agent_repo;
pub mod app_config;
pub mod database;
pub mod distributor_repo;
pub mod events;
pub mod forecast_client;
pub mod inventory_repo;
pub mod memory;
pub mod rate_limit;
pub mod retailer_repo;
pub mod stock_repo;

pub use agent_repo::StoreAgentRepository;
pub use database::DbClient;
pub use distributor_repo::StoreDistributorRepository;
pub use events::KafkaEventPublisher;
pub use forecast_client::HttpForecastClient;
pub use inventory_repo::StoreInventoryRepository;
pub use memory::MemoryStore;
pub use rate_limit::RateLimiter;
pub use retailer_repo::StoreRetailerRepository;
pub use stock_repo::StoreStockRepository;
