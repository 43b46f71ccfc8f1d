use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use nordic_catalog::{PriceAdjustmentResult, PricingEngine, StockKey};
use nordic_core::events::{publish, EventPublisher};
use nordic_core::forecast::{DemandForecaster, ForecastQuery};
use nordic_core::repository::{InventoryRepository, StockRepository};
use nordic_core::StoreError;
use nordic_shared::models::events::{PriceAdjustedEvent, PRICE_ADJUSTED_TOPIC};

#[derive(Debug, Clone, Deserialize)]
pub struct PricingRequest {
    pub product_name: String,
    pub country: String,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub base_price: Option<f64>,
}

impl PricingRequest {
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.product_name.trim().is_empty() || self.country.trim().is_empty() {
            return Err(PricingError::Validation("product_name and country are required".into()));
        }
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(PricingError::Validation(format!("month must be 1-12, got {}", month)));
            }
        }
        if let Some(price) = self.base_price {
            if !price.is_finite() || price < 0.0 {
                return Err(PricingError::Validation("base_price must be a non-negative number".into()));
            }
        }
        Ok(())
    }
}

/// Where the demand figure used for pricing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandSource {
    Forecast,
    Fallback,
}

impl DemandSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandSource::Forecast => "forecast",
            DemandSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingOutcome {
    #[serde(flatten)]
    pub result: PriceAdjustmentResult,
    pub demand_source: DemandSource,
    /// True when the price write created the stock record.
    pub upserted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Could not persist new price: {0}")]
    Persistence(StoreError),
}

pub struct DynamicPricingService {
    engine: PricingEngine,
    fallback_demand: f64,
    stock: Arc<dyn StockRepository>,
    inventory: Arc<dyn InventoryRepository>,
    forecaster: Arc<dyn DemandForecaster>,
    events: Arc<dyn EventPublisher>,
}

impl DynamicPricingService {
    pub fn new(
        engine: PricingEngine,
        fallback_demand: f64,
        stock: Arc<dyn StockRepository>,
        inventory: Arc<dyn InventoryRepository>,
        forecaster: Arc<dyn DemandForecaster>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self { engine, fallback_demand, stock, inventory, forecaster, events }
    }

    pub async fn adjust(&self, retailer_id: Uuid, request: &PricingRequest) -> Result<PricingOutcome, PricingError> {
        request.validate()?;

        let key = StockKey::new(retailer_id, request.product_name.trim(), request.country.trim());
        let month = request.month.unwrap_or_else(|| Utc::now().month());

        // 1. Gather stock and history
        let record = self.stock.get_stock(&key).await?;
        let history = self.inventory.sales_history(&key).await?;

        let current_stock = record.as_ref().map_or(0, |r| r.quantity);
        let base_price = request.base_price
            .or_else(|| record.as_ref().and_then(|r| r.current_price))
            .or_else(|| record.as_ref().and_then(|r| r.selling_price))
            .or(history.last_selling_price)
            .unwrap_or(0.0);
        let cost_price = record.as_ref()
            .and_then(|r| r.cost_price)
            .or(history.last_cost_price)
            .unwrap_or(0.0);

        // 2. Predict demand, degrading to history or the configured default
        let mut query = ForecastQuery::new(key.product_name.clone(), key.country.clone(), month);
        query.stock_level = current_stock as f64;
        if base_price > 0.0 {
            query.avg_price = base_price;
        }
        if let Some(sales) = history.last_sales {
            query.previous_sales = sales as f64;
        }

        let (predicted_demand, demand_source) = match self.forecaster.forecast(&query).await {
            Ok(forecast) if forecast.forecasted_sales.is_finite() && forecast.forecasted_sales > 0.0 => {
                (forecast.forecasted_sales, DemandSource::Forecast)
            }
            outcome => {
                let fallback = history.last_sales
                    .filter(|s| *s > 0)
                    .map(|s| s as f64)
                    .unwrap_or(self.fallback_demand);
                match outcome {
                    Ok(forecast) => warn!(
                        "Degraded forecast for {}/{}: non-positive prediction {}, using {}",
                        key.product_name, key.country, forecast.forecasted_sales, fallback
                    ),
                    Err(e) => warn!(
                        "Degraded forecast for {}/{}: {}, using {}",
                        key.product_name, key.country, e, fallback
                    ),
                }
                (fallback, DemandSource::Fallback)
            }
        };

        // 3. Price
        let result = self.engine.compute_adjusted_price(current_stock, predicted_demand, base_price, cost_price);

        // 4. Persist; a failed write must not be reported as applied
        let upserted = self.stock
            .set_price(&key, result.new_price)
            .await
            .map_err(PricingError::Persistence)?;

        info!(
            "Repriced {}/{} for retailer {}: {} -> {} ({})",
            key.product_name, key.country, retailer_id, result.old_price, result.new_price, result.reason
        );

        let event = PriceAdjustedEvent {
            retailer_id,
            product_name: key.product_name.clone(),
            country: key.country.clone(),
            old_price: result.old_price,
            new_price: result.new_price,
            reason: result.reason.clone(),
            demand_source: demand_source.as_str().to_string(),
            timestamp: Utc::now().timestamp(),
        };
        publish(self.events.as_ref(), PRICE_ADJUSTED_TOPIC, &retailer_id.to_string(), &event).await;

        Ok(PricingOutcome { result, demand_source, upserted })
    }
}
