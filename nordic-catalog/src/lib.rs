pub mod analytics;
pub mod forecast;
pub mod inventory;
pub mod pricing;
pub mod stock;

pub use forecast::SeededDemandModel;
pub use inventory::{InventoryEntry, NewInventoryEntry, SalesHistory};
pub use pricing::{compute_adjusted_price, PriceAdjustmentResult, PricingConfig, PricingEngine};
pub use stock::{SaleOutcome, StockKey, StockLedger, StockRecord};
