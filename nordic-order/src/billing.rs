use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use nordic_catalog::pricing::round_to_cents;
use nordic_catalog::StockKey;
use nordic_core::events::{publish, EventPublisher};
use nordic_core::repository::StockRepository;
use nordic_core::StoreError;
use nordic_shared::models::events::{StockDepletedEvent, STOCK_DEPLETED_TOPIC};

pub const BILL_MESSAGE: &str = "Billing completed and stock updated.";

/// One requested bill line as received. Fields are loose so a single bad
/// line can be reported without rejecting the whole bill.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillLineRequest {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub quantity: Option<Value>,
}

impl BillLineRequest {
    pub fn new(product_name: &str, country: &str, quantity: i64) -> Self {
        Self {
            product_name: Some(product_name.to_string()),
            country: Some(country.to_string()),
            quantity: Some(Value::from(quantity)),
        }
    }

    /// Product, country and a positive whole quantity, or `None`.
    fn parse(&self) -> Option<(&str, &str, i64)> {
        let product = self.product_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let country = self.country.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let quantity = match self.quantity.as_ref()? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }?;

        (quantity > 0).then_some((product, country, quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BillLine {
    Sold {
        product_name: String,
        country: String,
        sold_qty: i64,
        price_each: f64,
        line_total: f64,
        remaining_qty: i64,
        shortfall: i64,
    },
    Rejected {
        product_name: Option<String>,
        country: Option<String>,
        ok: bool,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bill {
    pub items: Vec<BillLine>,
    pub grand_total: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("items[] required")]
    EmptyBill,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct BillingService {
    stock: Arc<dyn StockRepository>,
    events: Arc<dyn EventPublisher>,
}

impl BillingService {
    pub fn new(stock: Arc<dyn StockRepository>, events: Arc<dyn EventPublisher>) -> Self {
        Self { stock, events }
    }

    /// Sell every valid line. Each line is its own atomic sale, so a store
    /// failure part way leaves earlier lines applied.
    pub async fn bill(&self, retailer_id: Uuid, lines: &[BillLineRequest]) -> Result<Bill, BillingError> {
        if lines.is_empty() {
            return Err(BillingError::EmptyBill);
        }

        let mut items = Vec::with_capacity(lines.len());
        let mut grand_total = 0.0;

        for line in lines {
            let Some((product_name, country, quantity)) = line.parse() else {
                items.push(BillLine::Rejected {
                    product_name: line.product_name.clone(),
                    country: line.country.clone(),
                    ok: false,
                    error: "Invalid line".to_string(),
                });
                continue;
            };

            let key = StockKey::new(retailer_id, product_name, country);
            let outcome = self.stock.sell(&key, quantity).await?;
            let line_total = outcome.unit_price * quantity as f64;
            grand_total += line_total;

            if outcome.shortfall > 0 {
                warn!(
                    "Sold {} x {} ({}) with only {} on hand for retailer {}",
                    quantity, product_name, country, outcome.previous_qty, retailer_id
                );
            }
            if outcome.depleted() {
                warn!("Stock empty for retailer {}: {} ({})", retailer_id, product_name, country);
                let event = StockDepletedEvent {
                    retailer_id,
                    product_name: product_name.to_string(),
                    country: country.to_string(),
                    timestamp: Utc::now().timestamp(),
                };
                publish(self.events.as_ref(), STOCK_DEPLETED_TOPIC, &retailer_id.to_string(), &event).await;
            }

            items.push(BillLine::Sold {
                product_name: product_name.to_string(),
                country: country.to_string(),
                sold_qty: quantity,
                price_each: outcome.unit_price,
                line_total: round_to_cents(line_total),
                remaining_qty: outcome.remaining_qty,
                shortfall: outcome.shortfall,
            });
        }

        let grand_total = round_to_cents(grand_total);
        info!("Billed {} lines for retailer {}: total {}", items.len(), retailer_id, grand_total);
        Ok(Bill { items, grand_total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPublisher;
    use nordic_catalog::NewInventoryEntry;
    use nordic_core::repository::InventoryRepository;
    use nordic_store::MemoryStore;
    use serde_json::json;

    async fn stocked_store(retailer_id: Uuid) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .record_intake(retailer_id, &NewInventoryEntry {
                product_name: "soap".into(),
                quantity: 5,
                expiry_date: None,
                country: "sweden".into(),
                month: 3,
                cost_price: Some(2.0),
                selling_price: Some(3.0),
                current_price: Some(3.333),
                sales: 0,
            })
            .await
            .unwrap();
        store
    }

    #[test]
    fn test_line_parsing() {
        assert_eq!(BillLineRequest::new("soap", "sweden", 2).parse(), Some(("soap", "sweden", 2)));

        let from_string = BillLineRequest { quantity: Some(json!("3")), ..BillLineRequest::new("soap", "sweden", 0) };
        assert_eq!(from_string.parse(), Some(("soap", "sweden", 3)));

        assert!(BillLineRequest::new("soap", "sweden", 0).parse().is_none());
        assert!(BillLineRequest::new("", "sweden", 1).parse().is_none());
        let fractional = BillLineRequest { quantity: Some(json!(1.5)), ..BillLineRequest::new("soap", "sweden", 1) };
        assert!(fractional.parse().is_none());
        let garbage = BillLineRequest { quantity: Some(json!("abc")), ..BillLineRequest::new("soap", "sweden", 1) };
        assert!(garbage.parse().is_none());
    }

    #[tokio::test]
    async fn test_bill_totals_and_stock() {
        let retailer_id = Uuid::new_v4();
        let store = stocked_store(retailer_id).await;
        let events = Arc::new(RecordingPublisher::default());
        let service = BillingService::new(store.clone(), events.clone());

        let bill = service
            .bill(retailer_id, &[BillLineRequest::new("soap", "sweden", 3), BillLineRequest::default()])
            .await
            .unwrap();

        assert_eq!(bill.grand_total, 10.0);
        assert_eq!(bill.items.len(), 2);
        match &bill.items[0] {
            BillLine::Sold { line_total, remaining_qty, shortfall, .. } => {
                assert_eq!(*line_total, 10.0);
                assert_eq!(*remaining_qty, 2);
                assert_eq!(*shortfall, 0);
            }
            other => panic!("unexpected line {:?}", other),
        }
        assert!(matches!(bill.items[1], BillLine::Rejected { ok: false, .. }));
        assert!(events.topics().await.is_empty());
    }

    #[tokio::test]
    async fn test_overselling_clamps_and_publishes_depletion() {
        let retailer_id = Uuid::new_v4();
        let store = stocked_store(retailer_id).await;
        let events = Arc::new(RecordingPublisher::default());
        let service = BillingService::new(store.clone(), events.clone());

        let bill = service.bill(retailer_id, &[BillLineRequest::new("soap", "sweden", 8)]).await.unwrap();

        match &bill.items[0] {
            BillLine::Sold { remaining_qty, shortfall, .. } => {
                assert_eq!(*remaining_qty, 0);
                assert_eq!(*shortfall, 3);
            }
            other => panic!("unexpected line {:?}", other),
        }
        assert_eq!(events.topics().await, vec![STOCK_DEPLETED_TOPIC.to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_product_bills_at_zero() {
        let service = BillingService::new(Arc::new(MemoryStore::new()), Arc::new(RecordingPublisher::default()));
        let bill = service.bill(Uuid::new_v4(), &[BillLineRequest::new("lotion", "norway", 2)]).await.unwrap();
        assert_eq!(bill.grand_total, 0.0);
    }

    #[tokio::test]
    async fn test_empty_bill_is_rejected() {
        let service = BillingService::new(Arc::new(MemoryStore::new()), Arc::new(RecordingPublisher::default()));
        assert!(matches!(service.bill(Uuid::new_v4(), &[]).await, Err(BillingError::EmptyBill)));
    }
}
