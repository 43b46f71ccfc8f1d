use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use nordic_core::forecast::ForecastQuery;
use nordic_order::{PricingOutcome, PricingRequest};

use crate::error::AppError;
use crate::extract::{CurrentRetailer, JsonBody};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub product_name: String,
    pub month: Option<u32>,
    pub avg_price: Option<f64>,
    pub promotion: Option<f64>,
    pub previous_sales: Option<f64>,
    pub season_index: Option<f64>,
    pub economic_index: Option<f64>,
    pub stock_level: Option<f64>,
}

impl ForecastRequest {
    fn into_query(self) -> Result<ForecastQuery, AppError> {
        let month = match self.month {
            Some(m) if !self.country.trim().is_empty() && !self.product_name.trim().is_empty() => m,
            _ => {
                return Err(AppError::ValidationError(
                    "Missing required fields: country, product_name, month".to_string(),
                ))
            }
        };
        if !(1..=12).contains(&month) {
            return Err(AppError::ValidationError(format!("month must be 1-12, got {}", month)));
        }

        let signals = [
            self.avg_price, self.promotion, self.previous_sales,
            self.season_index, self.economic_index, self.stock_level,
        ];
        if signals.iter().flatten().any(|v| !v.is_finite()) {
            return Err(AppError::ValidationError("forecast inputs must be finite numbers".to_string()));
        }

        let mut query = ForecastQuery::new(self.product_name.trim(), self.country.trim(), month);
        // Zero means "not provided", as the forecast service treats it
        let given = |v: Option<f64>| v.filter(|x| *x != 0.0);
        if let Some(v) = given(self.avg_price) { query.avg_price = v; }
        if let Some(v) = self.promotion { query.promotion = v; }
        if let Some(v) = given(self.previous_sales) { query.previous_sales = v; }
        if let Some(v) = given(self.season_index) { query.season_index = v; }
        if let Some(v) = given(self.economic_index) { query.economic_index = v; }
        if let Some(v) = given(self.stock_level) { query.stock_level = v; }
        Ok(query)
    }
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub success: bool,
    pub source: String,
    pub forecasted_sales: f64,
    pub suggested_stock: f64,
}

#[derive(Debug, Serialize)]
pub struct DynamicPricingResponse {
    pub success: bool,
    pub product_name: String,
    pub country: String,
    #[serde(flatten)]
    pub outcome: PricingOutcome,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/forecast", post(forecast))
        .route("/dynamic-pricing/{user_id}", post(dynamic_pricing))
}

/// POST /forecast
/// Predict unit sales for a product, country and month
pub async fn forecast(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ForecastRequest>,
) -> Result<Json<ForecastResponse>, AppError> {
    let query = req.into_query()?;
    let forecast = state.forecaster.forecast(&query).await?;

    Ok(Json(ForecastResponse {
        success: true,
        source: forecast.source,
        forecasted_sales: forecast.forecasted_sales,
        suggested_stock: forecast.suggested_stock,
    }))
}

/// POST /dynamic-pricing/{user_id}
/// Reprice a product from stock and predicted demand, then persist it
pub async fn dynamic_pricing(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    JsonBody(req): JsonBody<PricingRequest>,
) -> Result<Json<DynamicPricingResponse>, AppError> {
    let outcome = state.pricing.adjust(retailer.id, &req).await?;

    Ok(Json(DynamicPricingResponse {
        success: true,
        product_name: req.product_name.trim().to_string(),
        country: req.country.trim().to_string(),
        outcome,
    }))
}
