use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nordic_catalog::forecast::{suggested_stock, SeededDemandModel};

/// Inputs for a demand forecast. Optional signals carry the defaults the
/// forecast service expects when the caller has nothing better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub product_name: String,
    pub country: String,
    pub month: u32,
    pub avg_price: f64,
    pub promotion: f64,
    pub previous_sales: f64,
    pub season_index: f64,
    pub economic_index: f64,
    pub stock_level: f64,
}

impl ForecastQuery {
    pub fn new(product_name: impl Into<String>, country: impl Into<String>, month: u32) -> Self {
        Self {
            product_name: product_name.into(),
            country: country.into(),
            month,
            avg_price: 50.0,
            promotion: 0.0,
            previous_sales: 300.0,
            season_index: 0.8,
            economic_index: 1.0,
            stock_level: 400.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecasted_sales: f64,
    pub suggested_stock: f64,
    /// Which provider produced the numbers.
    pub source: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Forecast service unreachable: {0}")]
    Unavailable(String),
    #[error("Forecast service failed: {0}")]
    Rejected(String),
    #[error("Malformed forecast response: {0}")]
    Malformed(String),
}

/// Source of predicted unit demand.
#[async_trait]
pub trait DemandForecaster: Send + Sync {
    async fn forecast(&self, query: &ForecastQuery) -> Result<Forecast, ForecastError>;
}

#[async_trait]
impl DemandForecaster for SeededDemandModel {
    async fn forecast(&self, query: &ForecastQuery) -> Result<Forecast, ForecastError> {
        let forecasted_sales = f64::from(self.predict(&query.product_name, &query.country, query.month));
        Ok(Forecast {
            forecasted_sales,
            suggested_stock: suggested_stock(forecasted_sales),
            source: "seeded-model".to_string(),
        })
    }
}
