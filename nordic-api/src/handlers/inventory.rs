use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use nordic_catalog::analytics::{summarize, top_sold};
use nordic_catalog::{NewInventoryEntry, StockKey};
use nordic_core::models::StockFilter;

use crate::error::AppError;
use crate::extract::{CurrentRetailer, JsonBody, QueryParams};
use crate::state::AppState;

const DEFAULT_TOP_LIMIT: usize = 5;
const MAX_TOP_LIMIT: usize = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    #[serde(default)]
    pub product_name: String,
    pub quantity: Option<i64>,
    #[serde(default)]
    pub country: String,
    pub month: Option<u32>,
    #[serde(rename = "expiryDate")]
    pub expiry_date: Option<NaiveDate>,
    pub cost_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub current_price: Option<f64>,
    pub sales: Option<i64>,
}

fn check_price(name: &str, price: Option<f64>) -> Result<(), AppError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err(AppError::ValidationError(format!("{} must be a non-negative number", name)))
        }
        _ => Ok(()),
    }
}

impl AddItemRequest {
    fn validate(&self) -> Result<NewInventoryEntry, AppError> {
        let (Some(quantity), Some(month)) = (self.quantity, self.month) else {
            return Err(AppError::ValidationError(
                "Missing required fields: product_name, quantity, country, month".to_string(),
            ));
        };
        if self.product_name.trim().is_empty() || self.country.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Missing required fields: product_name, quantity, country, month".to_string(),
            ));
        }
        if quantity < 0 {
            return Err(AppError::ValidationError("quantity must not be negative".to_string()));
        }
        if !(1..=12).contains(&month) {
            return Err(AppError::ValidationError(format!("month must be 1-12, got {}", month)));
        }
        check_price("cost_price", self.cost_price)?;
        check_price("selling_price", self.selling_price)?;
        check_price("current_price", self.current_price)?;

        Ok(NewInventoryEntry {
            product_name: self.product_name.trim().to_string(),
            quantity,
            expiry_date: self.expiry_date,
            country: self.country.trim().to_string(),
            month,
            cost_price: self.cost_price,
            selling_price: self.selling_price,
            current_price: self.current_price,
            sales: self.sales.unwrap_or(0).max(0),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemResponse {
    pub message: String,
    pub item_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SetPriceRequest {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub country: String,
    pub current_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub product_name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub limit: Option<usize>,
}

impl TopQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT)
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/add-item/{user_id}", post(add_item))
        .route("/getItems/{user_id}", get(get_items))
        .route("/set-price/{user_id}", post(set_price))
        .route("/stock/{user_id}", get(get_stock))
        .route("/low-stock/{user_id}", get(low_stock))
        .route("/analytics/{user_id}", get(analytics))
        .route("/top-sold/{user_id}", get(top_sold_products))
        .route("/regional-top/{country}", get(regional_top))
}

/// POST /add-item/{user_id}
/// Record an intake and add it to current stock
pub async fn add_item(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    JsonBody(req): JsonBody<AddItemRequest>,
) -> Result<(StatusCode, Json<AddItemResponse>), AppError> {
    let entry = req.validate()?;
    let created = state.inventory.record_intake(retailer.id, &entry).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddItemResponse {
            message: "Item added successfully".to_string(),
            item_id: created.id,
        }),
    ))
}

/// GET /getItems/{user_id}
pub async fn get_items(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
) -> Result<Json<Value>, AppError> {
    let items = state.inventory.list_entries(retailer.id).await?;
    Ok(Json(json!({ "items": items })))
}

/// POST /set-price/{user_id}
pub async fn set_price(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    JsonBody(req): JsonBody<SetPriceRequest>,
) -> Result<Json<Value>, AppError> {
    let price = match req.current_price {
        Some(p) if !req.product_name.trim().is_empty() && !req.country.trim().is_empty() => p,
        _ => {
            return Err(AppError::ValidationError(
                "product_name, country, current_price are required".to_string(),
            ))
        }
    };
    check_price("current_price", Some(price))?;

    let key = StockKey::new(retailer.id, req.product_name.trim(), req.country.trim());
    let upserted = state.stock.set_price(&key, price).await?;

    Ok(Json(json!({ "success": true, "upserted": upserted })))
}

/// GET /stock/{user_id}?product_name=&country=
pub async fn get_stock(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    QueryParams(query): QueryParams<StockQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = StockFilter {
        product_name: query.product_name.filter(|s| !s.is_empty()),
        country: query.country.filter(|s| !s.is_empty()),
    };
    let stock = state.stock.list_stock(retailer.id, &filter).await?;
    Ok(Json(json!({ "success": true, "stock": stock })))
}

/// GET /low-stock/{user_id}?threshold=
pub async fn low_stock(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    QueryParams(query): QueryParams<LowStockQuery>,
) -> Result<Json<Value>, AppError> {
    let threshold = query.threshold.unwrap_or(state.config.inventory.low_stock_threshold);
    let stock = state.stock.low_stock(retailer.id, threshold).await?;

    if !stock.is_empty() {
        tracing::warn!("Retailer {} has {} product(s) below {}", retailer.id, stock.len(), threshold);
    }

    Ok(Json(json!({ "success": true, "threshold": threshold, "stock": stock })))
}

/// GET /analytics/{user_id}
/// Per product/country roll-up of inventory history
pub async fn analytics(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
) -> Result<Json<Value>, AppError> {
    let entries = state.inventory.list_entries(retailer.id).await?;
    Ok(Json(json!({ "success": true, "summary": summarize(&entries) })))
}

/// GET /top-sold/{user_id}?limit=
pub async fn top_sold_products(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    QueryParams(query): QueryParams<TopQuery>,
) -> Result<Json<Value>, AppError> {
    let entries = state.inventory.list_entries(retailer.id).await?;
    Ok(Json(json!({ "success": true, "products": top_sold(&entries, query.limit()) })))
}

/// GET /regional-top/{country}?limit=
/// Best sellers in a country across all retailers
pub async fn regional_top(
    State(state): State<AppState>,
    Path(country): Path<String>,
    QueryParams(query): QueryParams<TopQuery>,
) -> Result<Json<Value>, AppError> {
    let entries = state.inventory.entries_for_country(country.trim()).await?;
    Ok(Json(json!({
        "success": true,
        "country": country,
        "products": top_sold(&entries, query.limit()),
    })))
}
