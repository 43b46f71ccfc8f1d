use chrono::{DateTime, Utc};
use nordic_shared::models::events::RestockLine;
use nordic_shared::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shop owner. Every inventory, stock and agent record is scoped to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retailer {
    pub id: Uuid,
    pub username: String,
    pub email: Option<Masked<String>>,
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRetailer {
    pub username: String,
    pub email: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAgent {
    pub id: Uuid,
    pub retailer_id: Uuid,
    pub delivery_name: String,
    pub delivery_number: Masked<String>,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDeliveryAgent {
    pub delivery_name: String,
    pub delivery_number: String,
    pub location: String,
}

/// Wholesale supplier serving a city. Shared by all retailers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distributor {
    pub id: Uuid,
    pub location: String,
    pub name: String,
    pub contact: Masked<String>,
    pub email: Option<Masked<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDistributor {
    pub name: String,
    pub contact: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestockOrder {
    pub id: Uuid,
    pub retailer_id: Uuid,
    pub city: String,
    pub lines: Vec<RestockLine>,
    pub distributor_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl RestockOrder {
    pub fn new(retailer_id: Uuid, city: String, lines: Vec<RestockLine>, distributor_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            retailer_id,
            city,
            lines,
            distributor_ids,
            created_at: Utc::now(),
        }
    }
}

/// Optional filters for stock listings.
#[derive(Debug, Clone, Default)]
pub struct StockFilter {
    pub product_name: Option<String>,
    pub country: Option<String>,
}

impl StockFilter {
    pub fn matches(&self, product_name: &str, country: &str) -> bool {
        self.product_name.as_deref().map_or(true, |p| p == product_name)
            && self.country.as_deref().map_or(true, |c| c == country)
    }
}

/// Case-insensitive substring match used for agent location search.
pub fn location_matches(location: &str, needle: &str) -> bool {
    location.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive equality used for distributor city lookup.
pub fn same_city(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
