use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use nordic_core::events::{publish, EventPublisher};
use nordic_core::models::{Retailer, RestockOrder};
use nordic_core::repository::{DistributorRepository, StockRepository};
use nordic_core::StoreError;
use nordic_shared::models::events::{RestockLine, RestockRequestedEvent, RESTOCK_REQUESTED_TOPIC};

#[derive(Debug, thiserror::Error)]
pub enum RestockError {
    #[error("{0}")]
    Validation(String),
    #[error("No distributors found for {0}")]
    NoDistributor(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a replenishment check for one low-stock product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplenishItem {
    /// `country/product_name`, unique per retailer.
    pub product_id: String,
    pub name: String,
    pub country: String,
    pub on_hand: i64,
    pub suggested_quantity: i64,
    pub needs_restock: bool,
    pub order_placed: bool,
}

pub struct RestockService {
    stock: Arc<dyn StockRepository>,
    distributors: Arc<dyn DistributorRepository>,
    events: Arc<dyn EventPublisher>,
}

impl RestockService {
    pub fn new(
        stock: Arc<dyn StockRepository>,
        distributors: Arc<dyn DistributorRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self { stock, distributors, events }
    }

    /// Send a restock order to every distributor serving `city`.
    pub async fn place_order(&self, retailer_id: Uuid, city: &str, lines: Vec<RestockLine>) -> Result<RestockOrder, RestockError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(RestockError::Validation("city is required".into()));
        }
        if lines.is_empty() {
            return Err(RestockError::Validation("order_items[] required".into()));
        }
        if let Some(bad) = lines.iter().find(|l| l.product_name.trim().is_empty() || l.quantity <= 0) {
            return Err(RestockError::Validation(format!(
                "invalid order item '{}': quantity must be positive",
                bad.product_name
            )));
        }

        let distributors = self.distributors.list_distributors(Some(city)).await?;
        if distributors.is_empty() {
            return Err(RestockError::NoDistributor(city.to_string()));
        }

        let order = RestockOrder::new(
            retailer_id,
            city.to_string(),
            lines,
            distributors.iter().map(|d| d.id).collect(),
        );
        self.distributors.create_restock_order(&order).await?;

        info!(
            "Restock order {} for retailer {} sent to {} distributor(s) in {}",
            order.id, retailer_id, order.distributor_ids.len(), city
        );

        let event = RestockRequestedEvent {
            order_id: order.id,
            retailer_id,
            city: order.city.clone(),
            distributor_ids: order.distributor_ids.clone(),
            lines: order.lines.clone(),
            timestamp: Utc::now().timestamp(),
        };
        publish(self.events.as_ref(), RESTOCK_REQUESTED_TOPIC, &order.id.to_string(), &event).await;

        Ok(order)
    }

    /// Find products below `threshold` and order them up to `target`
    /// from distributors in the retailer's region.
    pub async fn replenish_check(&self, retailer: &Retailer, threshold: i64, target: i64) -> Result<Vec<ReplenishItem>, RestockError> {
        let low = self.stock.low_stock(retailer.id, threshold).await?;
        if low.is_empty() {
            return Ok(Vec::new());
        }

        let mut items: Vec<ReplenishItem> = low
            .iter()
            .map(|record| ReplenishItem {
                product_id: format!("{}/{}", record.country, record.product_name),
                name: record.product_name.clone(),
                country: record.country.clone(),
                on_hand: record.quantity,
                suggested_quantity: (target - record.quantity).max(1),
                needs_restock: true,
                order_placed: false,
            })
            .collect();

        let Some(region) = retailer.region.as_deref().filter(|r| !r.trim().is_empty()) else {
            warn!("Retailer {} has no region; {} product(s) need manual restock", retailer.id, items.len());
            return Ok(items);
        };

        let lines = items
            .iter()
            .map(|item| RestockLine { product_name: item.name.clone(), quantity: item.suggested_quantity })
            .collect();

        match self.place_order(retailer.id, region, lines).await {
            Ok(_) => items.iter_mut().for_each(|item| item.order_placed = true),
            Err(RestockError::NoDistributor(city)) => {
                warn!("No distributor serves {}; replenishment for retailer {} not ordered", city, retailer.id);
            }
            Err(e) => return Err(e),
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPublisher;
    use nordic_catalog::NewInventoryEntry;
    use nordic_core::models::{NewDistributor, NewRetailer};
    use nordic_core::repository::{InventoryRepository, RetailerRepository};
    use nordic_store::MemoryStore;

    fn line(product: &str, quantity: i64) -> RestockLine {
        RestockLine { product_name: product.to_string(), quantity }
    }

    async fn setup(region: Option<&str>) -> (Arc<MemoryStore>, Retailer) {
        let store = Arc::new(MemoryStore::new());
        let retailer = store
            .create_retailer(&NewRetailer { username: "lina".into(), email: None, region: region.map(String::from) })
            .await
            .unwrap();

        for (product, quantity) in [("soap", 4), ("lotion", 150)] {
            store
                .record_intake(retailer.id, &NewInventoryEntry {
                    product_name: product.into(),
                    quantity,
                    expiry_date: None,
                    country: "finland".into(),
                    month: 2,
                    cost_price: None,
                    selling_price: None,
                    current_price: None,
                    sales: 0,
                })
                .await
                .unwrap();
        }
        store
            .add_distributors("Helsinki", &[NewDistributor { name: "Tukku Oy".into(), contact: "+358401234567".into(), email: None }])
            .await
            .unwrap();

        (store, retailer)
    }

    #[tokio::test]
    async fn test_order_goes_to_city_distributors() {
        let (store, retailer) = setup(None).await;
        let events = Arc::new(RecordingPublisher::default());
        let service = RestockService::new(store.clone(), store.clone(), events.clone());

        let order = service.place_order(retailer.id, "helsinki", vec![line("soap", 20)]).await.unwrap();

        assert_eq!(order.distributor_ids.len(), 1);
        assert_eq!(store.list_restock_orders(retailer.id).await.unwrap().len(), 1);
        assert_eq!(events.topics().await, vec![RESTOCK_REQUESTED_TOPIC.to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_city_has_no_distributor() {
        let (store, retailer) = setup(None).await;
        let service = RestockService::new(store.clone(), store, Arc::new(RecordingPublisher::default()));

        let err = service.place_order(retailer.id, "Tampere", vec![line("soap", 20)]).await.unwrap_err();
        assert!(matches!(err, RestockError::NoDistributor(_)));
    }

    #[tokio::test]
    async fn test_invalid_lines_are_rejected() {
        let (store, retailer) = setup(None).await;
        let service = RestockService::new(store.clone(), store, Arc::new(RecordingPublisher::default()));

        assert!(matches!(
            service.place_order(retailer.id, "Helsinki", vec![line("soap", 0)]).await,
            Err(RestockError::Validation(_))
        ));
        assert!(matches!(
            service.place_order(retailer.id, "Helsinki", vec![]).await,
            Err(RestockError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_replenish_orders_low_stock_in_region() {
        let (store, retailer) = setup(Some("Helsinki")).await;
        let service = RestockService::new(store.clone(), store.clone(), Arc::new(RecordingPublisher::default()));

        let items = service.replenish_check(&retailer, 20, 100).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "soap");
        assert_eq!(items[0].suggested_quantity, 96);
        assert!(items[0].order_placed);

        let orders = store.list_restock_orders(retailer.id).await.unwrap();
        assert_eq!(orders[0].lines, vec![line("soap", 96)]);
    }

    #[tokio::test]
    async fn test_replenish_without_region_only_reports() {
        let (store, retailer) = setup(None).await;
        let service = RestockService::new(store.clone(), store.clone(), Arc::new(RecordingPublisher::default()));

        let items = service.replenish_check(&retailer, 20, 100).await.unwrap();

        assert!(items[0].needs_restock);
        assert!(!items[0].order_placed);
        assert!(store.list_restock_orders(retailer.id).await.unwrap().is_empty());
    }
}
