use async_trait::async_trait;
use uuid::Uuid;

use nordic_catalog::{InventoryEntry, NewInventoryEntry, SaleOutcome, SalesHistory, StockKey, StockRecord};

use crate::models::{
    DeliveryAgent, Distributor, NewDeliveryAgent, NewDistributor, NewRetailer, Retailer, RestockOrder,
    StockFilter,
};
use crate::StoreResult;

/// Repository trait for retailer accounts
#[async_trait]
pub trait RetailerRepository: Send + Sync {
    /// Fails with `StoreError::Conflict` when the username is taken.
    async fn create_retailer(&self, retailer: &NewRetailer) -> StoreResult<Retailer>;

    async fn get_retailer(&self, id: Uuid) -> StoreResult<Option<Retailer>>;
}

/// Repository trait for inventory history
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Store the intake and add its quantity to the stock record in one
    /// atomic step. Prices given on the intake overwrite the stock prices.
    async fn record_intake(&self, retailer_id: Uuid, entry: &NewInventoryEntry) -> StoreResult<InventoryEntry>;

    async fn list_entries(&self, retailer_id: Uuid) -> StoreResult<Vec<InventoryEntry>>;

    async fn sales_history(&self, key: &StockKey) -> StoreResult<SalesHistory>;

    /// Entries across every retailer for a country.
    async fn entries_for_country(&self, country: &str) -> StoreResult<Vec<InventoryEntry>>;
}

/// Repository trait for current stock and prices
#[async_trait]
pub trait StockRepository: Send + Sync {
    async fn get_stock(&self, key: &StockKey) -> StoreResult<Option<StockRecord>>;

    /// Sorted by country, then product name.
    async fn list_stock(&self, retailer_id: Uuid, filter: &StockFilter) -> StoreResult<Vec<StockRecord>>;

    /// Upsert the current price. Returns `true` when the record was created.
    async fn set_price(&self, key: &StockKey, price: f64) -> StoreResult<bool>;

    /// Atomic decrement with a floor at zero. Creates an empty record for
    /// unknown products.
    async fn sell(&self, key: &StockKey, quantity: i64) -> StoreResult<SaleOutcome>;

    /// Records whose quantity is strictly below `threshold`.
    async fn low_stock(&self, retailer_id: Uuid, threshold: i64) -> StoreResult<Vec<StockRecord>>;
}

/// Repository trait for delivery agents
#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn add_agent(&self, retailer_id: Uuid, agent: &NewDeliveryAgent) -> StoreResult<DeliveryAgent>;

    /// `location` is a case-insensitive substring filter.
    async fn list_agents(&self, retailer_id: Uuid, location: Option<&str>) -> StoreResult<Vec<DeliveryAgent>>;
}

/// Repository trait for distributors and restock orders
#[async_trait]
pub trait DistributorRepository: Send + Sync {
    async fn add_distributors(&self, location: &str, distributors: &[NewDistributor]) -> StoreResult<Vec<Distributor>>;

    /// `location` matches the city case-insensitively.
    async fn list_distributors(&self, location: Option<&str>) -> StoreResult<Vec<Distributor>>;

    async fn create_restock_order(&self, order: &RestockOrder) -> StoreResult<()>;

    async fn list_restock_orders(&self, retailer_id: Uuid) -> StoreResult<Vec<RestockOrder>>;
}
