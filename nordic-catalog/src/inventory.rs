use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One inventory intake, recorded per month. Kept as history; the running
/// quantity lives in the stock record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub id: Uuid,
    pub retailer_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub expiry_date: Option<NaiveDate>,
    pub country: String,
    pub month: u32,
    pub cost_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub sales: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when inventory arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryEntry {
    pub product_name: String,
    pub quantity: i64,
    pub expiry_date: Option<NaiveDate>,
    pub country: String,
    pub month: u32,
    pub cost_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub current_price: Option<f64>,
    pub sales: i64,
}

impl InventoryEntry {
    pub fn from_new(retailer_id: Uuid, new: &NewInventoryEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            retailer_id,
            product_name: new.product_name.clone(),
            quantity: new.quantity,
            expiry_date: new.expiry_date,
            country: new.country.clone(),
            month: new.month,
            cost_price: new.cost_price,
            selling_price: new.selling_price,
            sales: new.sales,
            created_at: Utc::now(),
        }
    }
}

/// Latest known figures for a product/country, taken from inventory history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesHistory {
    pub last_sales: Option<i64>,
    pub last_cost_price: Option<f64>,
    pub last_selling_price: Option<f64>,
}

impl SalesHistory {
    /// Build from entries of a single product/country, newest first wins.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a InventoryEntry>) -> Self {
        let mut sorted: Vec<&InventoryEntry> = entries.into_iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            last_sales: sorted.first().map(|e| e.sales),
            last_cost_price: sorted.iter().find_map(|e| e.cost_price),
            last_selling_price: sorted.iter().find_map(|e| e.selling_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(sales: i64, cost: Option<f64>, age_minutes: i64) -> InventoryEntry {
        InventoryEntry {
            id: Uuid::new_v4(),
            retailer_id: Uuid::nil(),
            product_name: "soap".to_string(),
            quantity: 10,
            expiry_date: None,
            country: "sweden".to_string(),
            month: 11,
            cost_price: cost,
            selling_price: Some(20.0),
            sales,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn test_history_prefers_newest_entry() {
        let entries = vec![entry(150, Some(10.0), 60), entry(90, None, 5)];
        let history = SalesHistory::from_entries(&entries);
        assert_eq!(history.last_sales, Some(90));
        // Newest entry has no cost price, so the older one is used.
        assert_eq!(history.last_cost_price, Some(10.0));
        assert_eq!(history.last_selling_price, Some(20.0));
    }

    #[test]
    fn test_empty_history() {
        let entries: Vec<InventoryEntry> = Vec::new();
        let history = SalesHistory::from_entries(&entries);
        assert_eq!(history, SalesHistory::default());
    }
}
