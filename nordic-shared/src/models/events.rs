use uuid::Uuid;

pub const STOCK_DEPLETED_TOPIC: &str = "stock.depleted";
pub const PRICE_ADJUSTED_TOPIC: &str = "price.adjusted";
pub const RESTOCK_REQUESTED_TOPIC: &str = "restock.requested";

/// Emitted when a sale leaves a stock record at zero.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct StockDepletedEvent {
    pub retailer_id: Uuid,
    pub product_name: String,
    pub country: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PriceAdjustedEvent {
    pub retailer_id: Uuid,
    pub product_name: String,
    pub country: String,
    pub old_price: f64,
    pub new_price: f64,
    pub reason: String,
    pub demand_source: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct RestockLine {
    pub product_name: String,
    pub quantity: i64,
}

/// Stands in for the distributor notification e-mail.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RestockRequestedEvent {
    pub order_id: Uuid,
    pub retailer_id: Uuid,
    pub city: String,
    pub distributor_ids: Vec<Uuid>,
    pub lines: Vec<RestockLine>,
    pub timestamp: i64,
}
