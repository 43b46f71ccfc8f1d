pub mod agents;
pub mod billing;
pub mod forecasting;
pub mod inventory;
pub mod restock;
pub mod retailers;
