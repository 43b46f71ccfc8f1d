pub mod billing;
pub mod pricing;
pub mod restock;

#[cfg(test)]
mod testing;

pub use billing::{Bill, BillLine, BillLineRequest, BillingError, BillingService};
pub use pricing::{DemandSource, DynamicPricingService, PricingError, PricingOutcome, PricingRequest};
pub use restock::{ReplenishItem, RestockError, RestockService};
