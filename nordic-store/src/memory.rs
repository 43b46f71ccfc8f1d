//! In-process implementation of every repository trait, backing the unit
//! and HTTP tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use nordic_catalog::{InventoryEntry, NewInventoryEntry, SaleOutcome, SalesHistory, StockKey, StockLedger, StockRecord};
use nordic_core::models::{
    location_matches, same_city, DeliveryAgent, Distributor, NewDeliveryAgent, NewDistributor, NewRetailer,
    Retailer, RestockOrder, StockFilter,
};
use nordic_core::repository::{
    AgentRepository, DistributorRepository, InventoryRepository, RetailerRepository, StockRepository,
};
use nordic_core::{StoreError, StoreResult};
use nordic_shared::Masked;

#[derive(Default)]
pub struct MemoryStore {
    retailers: RwLock<Vec<Retailer>>,
    entries: RwLock<Vec<InventoryEntry>>,
    stock: RwLock<StockLedger>,
    agents: RwLock<Vec<DeliveryAgent>>,
    distributors: RwLock<Vec<Distributor>>,
    restock_orders: RwLock<Vec<RestockOrder>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RetailerRepository for MemoryStore {
    async fn create_retailer(&self, retailer: &NewRetailer) -> StoreResult<Retailer> {
        let mut retailers = self.retailers.write().await;
        if retailers.iter().any(|r| r.username == retailer.username) {
            return Err(StoreError::Conflict(format!("username {} already exists", retailer.username)));
        }

        let created = Retailer {
            id: Uuid::new_v4(),
            username: retailer.username.clone(),
            email: retailer.email.clone().map(Masked),
            region: retailer.region.clone(),
            created_at: Utc::now(),
        };
        retailers.push(created.clone());
        Ok(created)
    }

    async fn get_retailer(&self, id: Uuid) -> StoreResult<Option<Retailer>> {
        Ok(self.retailers.read().await.iter().find(|r| r.id == id).cloned())
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn record_intake(&self, retailer_id: Uuid, entry: &NewInventoryEntry) -> StoreResult<InventoryEntry> {
        let record = InventoryEntry::from_new(retailer_id, entry);

        // Hold both locks so the entry and the stock change land together
        let mut entries = self.entries.write().await;
        let mut stock = self.stock.write().await;

        let key = StockKey::new(retailer_id, entry.product_name.clone(), entry.country.clone());
        let (current, _) = stock.upsert(&key);
        current.restock(entry.quantity.max(0));
        if entry.current_price.is_some() {
            current.current_price = entry.current_price;
        }
        if entry.cost_price.is_some() {
            current.cost_price = entry.cost_price;
        }
        if entry.selling_price.is_some() {
            current.selling_price = entry.selling_price;
        }

        entries.push(record.clone());
        Ok(record)
    }

    async fn list_entries(&self, retailer_id: Uuid) -> StoreResult<Vec<InventoryEntry>> {
        Ok(self.entries.read().await
            .iter()
            .filter(|e| e.retailer_id == retailer_id)
            .cloned()
            .collect())
    }

    async fn sales_history(&self, key: &StockKey) -> StoreResult<SalesHistory> {
        let entries = self.entries.read().await;
        Ok(SalesHistory::from_entries(entries.iter().filter(|e| {
            e.retailer_id == key.retailer_id && e.product_name == key.product_name && e.country == key.country
        })))
    }

    async fn entries_for_country(&self, country: &str) -> StoreResult<Vec<InventoryEntry>> {
        Ok(self.entries.read().await
            .iter()
            .filter(|e| e.country == country)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StockRepository for MemoryStore {
    async fn get_stock(&self, key: &StockKey) -> StoreResult<Option<StockRecord>> {
        Ok(self.stock.read().await.get(key).cloned())
    }

    async fn list_stock(&self, retailer_id: Uuid, filter: &StockFilter) -> StoreResult<Vec<StockRecord>> {
        Ok(self.stock.read().await
            .list(retailer_id)
            .into_iter()
            .filter(|r| filter.matches(&r.product_name, &r.country))
            .collect())
    }

    async fn set_price(&self, key: &StockKey, price: f64) -> StoreResult<bool> {
        let mut stock = self.stock.write().await;
        let (record, created) = stock.upsert(key);
        record.current_price = Some(price);
        record.updated_at = Utc::now();
        Ok(created)
    }

    async fn sell(&self, key: &StockKey, quantity: i64) -> StoreResult<SaleOutcome> {
        Ok(self.stock.write().await.sell(key, quantity))
    }

    async fn low_stock(&self, retailer_id: Uuid, threshold: i64) -> StoreResult<Vec<StockRecord>> {
        let mut low: Vec<StockRecord> = self.stock.read().await
            .list(retailer_id)
            .into_iter()
            .filter(|r| r.quantity < threshold)
            .collect();
        low.sort_by(|a, b| {
            a.quantity.cmp(&b.quantity)
                .then_with(|| a.product_name.cmp(&b.product_name))
                .then_with(|| a.country.cmp(&b.country))
        });
        Ok(low)
    }
}

#[async_trait]
impl AgentRepository for MemoryStore {
    async fn add_agent(&self, retailer_id: Uuid, agent: &NewDeliveryAgent) -> StoreResult<DeliveryAgent> {
        let created = DeliveryAgent {
            id: Uuid::new_v4(),
            retailer_id,
            delivery_name: agent.delivery_name.clone(),
            delivery_number: Masked(agent.delivery_number.clone()),
            location: agent.location.clone(),
            created_at: Utc::now(),
        };
        self.agents.write().await.push(created.clone());
        Ok(created)
    }

    async fn list_agents(&self, retailer_id: Uuid, location: Option<&str>) -> StoreResult<Vec<DeliveryAgent>> {
        Ok(self.agents.read().await
            .iter()
            .filter(|a| a.retailer_id == retailer_id)
            .filter(|a| location.map_or(true, |needle| location_matches(&a.location, needle)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DistributorRepository for MemoryStore {
    async fn add_distributors(&self, location: &str, distributors: &[NewDistributor]) -> StoreResult<Vec<Distributor>> {
        let now = Utc::now();
        let created: Vec<Distributor> = distributors
            .iter()
            .map(|d| Distributor {
                id: Uuid::new_v4(),
                location: location.trim().to_string(),
                name: d.name.clone(),
                contact: Masked(d.contact.clone()),
                email: d.email.clone().map(Masked),
                created_at: now,
            })
            .collect();

        self.distributors.write().await.extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_distributors(&self, location: Option<&str>) -> StoreResult<Vec<Distributor>> {
        let mut found: Vec<Distributor> = self.distributors.read().await
            .iter()
            .filter(|d| location.map_or(true, |city| same_city(&d.location, city)))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.location.cmp(&b.location).then_with(|| a.name.cmp(&b.name)));
        Ok(found)
    }

    async fn create_restock_order(&self, order: &RestockOrder) -> StoreResult<()> {
        self.restock_orders.write().await.push(order.clone());
        Ok(())
    }

    async fn list_restock_orders(&self, retailer_id: Uuid) -> StoreResult<Vec<RestockOrder>> {
        let mut orders: Vec<RestockOrder> = self.restock_orders.read().await
            .iter()
            .filter(|o| o.retailer_id == retailer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
