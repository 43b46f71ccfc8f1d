use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identity of a stock record: one per retailer, product and country.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub retailer_id: Uuid,
    pub product_name: String,
    pub country: String,
}

impl StockKey {
    pub fn new(retailer_id: Uuid, product_name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            retailer_id,
            product_name: product_name.into(),
            country: country.into(),
        }
    }
}

/// Current quantity and price for a product in a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub retailer_id: Uuid,
    pub product_name: String,
    pub country: String,
    pub quantity: i64,
    pub current_price: Option<f64>,
    pub cost_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockRecord {
    pub fn empty(key: &StockKey) -> Self {
        let now = Utc::now();
        Self {
            retailer_id: key.retailer_id,
            product_name: key.product_name.clone(),
            country: key.country.clone(),
            quantity: 0,
            current_price: None,
            cost_price: None,
            selling_price: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.retailer_id, self.product_name.clone(), self.country.clone())
    }

    /// Price charged at the till: current price, else selling price, else 0.
    pub fn effective_price(&self) -> f64 {
        self.current_price
            .or(self.selling_price)
            .filter(|p| p.is_finite())
            .unwrap_or(0.0)
    }

    /// Add delivered units.
    pub fn restock(&mut self, quantity: i64) {
        self.quantity = self.quantity.saturating_add(quantity).max(0);
        self.updated_at = Utc::now();
    }

    /// Record a sale. The quantity never drops below zero; units sold beyond
    /// what was on hand are reported as a shortfall.
    pub fn sell(&mut self, quantity: i64) -> SaleOutcome {
        let previous_qty = self.quantity.max(0);
        let remaining_qty = (previous_qty - quantity).max(0);
        self.quantity = remaining_qty;
        self.updated_at = Utc::now();

        SaleOutcome {
            sold_qty: quantity,
            previous_qty,
            remaining_qty,
            shortfall: (quantity - previous_qty).max(0),
            unit_price: self.effective_price(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaleOutcome {
    pub sold_qty: i64,
    pub previous_qty: i64,
    pub remaining_qty: i64,
    pub shortfall: i64,
    pub unit_price: f64,
}

impl SaleOutcome {
    pub fn depleted(&self) -> bool {
        self.remaining_qty == 0
    }
}

/// In-memory stock table. Callers serialise access (e.g. behind a lock),
/// which makes every mutation below atomic with respect to other sales.
#[derive(Debug, Default)]
pub struct StockLedger {
    records: BTreeMap<StockKey, StockRecord>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self { records: BTreeMap::new() }
    }

    pub fn get(&self, key: &StockKey) -> Option<&StockRecord> {
        self.records.get(key)
    }

    /// Fetch a record, creating an empty one if it does not exist yet.
    /// Returns whether the record was created.
    pub fn upsert(&mut self, key: &StockKey) -> (&mut StockRecord, bool) {
        let created = !self.records.contains_key(key);
        let record = self.records
            .entry(key.clone())
            .or_insert_with(|| StockRecord::empty(key));
        (record, created)
    }

    pub fn sell(&mut self, key: &StockKey, quantity: i64) -> SaleOutcome {
        let (record, _) = self.upsert(key);
        record.sell(quantity)
    }

    /// Records for a retailer ordered by country then product name.
    pub fn list(&self, retailer_id: Uuid) -> Vec<StockRecord> {
        let mut records: Vec<StockRecord> = self.records
            .values()
            .filter(|r| r.retailer_id == retailer_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.country.cmp(&b.country).then_with(|| a.product_name.cmp(&b.product_name))
        });
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> StockKey {
        StockKey::new(Uuid::new_v4(), "shampoo", "sweden")
    }

    #[test]
    fn test_stock_lifecycle() {
        let mut ledger = StockLedger::new();
        let key = key();

        let (record, created) = ledger.upsert(&key);
        assert!(created);
        record.restock(100);
        record.current_price = Some(48.99);

        let outcome = ledger.sell(&key, 10);
        assert_eq!(outcome.previous_qty, 100);
        assert_eq!(outcome.remaining_qty, 90);
        assert_eq!(outcome.shortfall, 0);
        assert_eq!(outcome.unit_price, 48.99);
        assert_eq!(ledger.get(&key).unwrap().quantity, 90);

        let (_, created) = ledger.upsert(&key);
        assert!(!created);
    }

    #[test]
    fn test_sale_clamps_at_zero() {
        let mut ledger = StockLedger::new();
        let key = key();
        ledger.upsert(&key).0.restock(3);

        let outcome = ledger.sell(&key, 5);
        assert_eq!(outcome.remaining_qty, 0);
        assert_eq!(outcome.shortfall, 2);
        assert!(outcome.depleted());
        assert_eq!(ledger.get(&key).unwrap().quantity, 0);
    }

    #[test]
    fn test_sale_on_unknown_product_creates_empty_record() {
        let mut ledger = StockLedger::new();
        let key = key();

        let outcome = ledger.sell(&key, 1);
        assert_eq!(outcome.unit_price, 0.0);
        assert_eq!(outcome.shortfall, 1);
        assert!(ledger.get(&key).is_some());
    }

    #[test]
    fn test_effective_price_falls_back_to_selling_price() {
        let mut record = StockRecord::empty(&key());
        assert_eq!(record.effective_price(), 0.0);
        record.selling_price = Some(20.0);
        assert_eq!(record.effective_price(), 20.0);
        record.current_price = Some(18.5);
        assert_eq!(record.effective_price(), 18.5);
    }

    #[test]
    fn test_list_is_sorted_and_scoped() {
        let mut ledger = StockLedger::new();
        let retailer = Uuid::new_v4();
        ledger.upsert(&StockKey::new(retailer, "soap", "sweden"));
        ledger.upsert(&StockKey::new(retailer, "lotion", "denmark"));
        ledger.upsert(&StockKey::new(retailer, "shampoo", "sweden"));
        ledger.upsert(&StockKey::new(Uuid::new_v4(), "soap", "norway"));

        let names: Vec<(String, String)> = ledger.list(retailer)
            .into_iter()
            .map(|r| (r.country, r.product_name))
            .collect();
        assert_eq!(names, vec![
            ("denmark".to_string(), "lotion".to_string()),
            ("sweden".to_string(), "shampoo".to_string()),
            ("sweden".to_string(), "soap".to_string()),
        ]);
    }
}
