use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use nordic_shared::models::events::RestockLine;

use crate::error::AppError;
use crate::extract::{CurrentRetailer, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockOrderRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub city: String,
    #[serde(default, rename = "order_items")]
    pub order_items: Vec<RestockLine>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/restock-order", post(place_restock_order))
        .route("/replenish/check/{user_id}", post(replenish_check))
}

/// POST /restock-order
/// Order stock from the distributors serving a city
pub async fn place_restock_order(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RestockOrderRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let retailer = state.retailers
        .get_retailer(req.user_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    let order = state.restock.place_order(retailer.id, &req.city, req.order_items).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": format!("Restock order sent to {} distributor(s) in {}", order.distributor_ids.len(), order.city),
            "orderId": order.id,
            "distributors": order.distributor_ids,
        })),
    ))
}

/// POST /replenish/check/{user_id}
/// Flag low-stock products and auto-order them from the retailer's region
pub async fn replenish_check(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
) -> Result<Json<Value>, AppError> {
    let inventory = &state.config.inventory;
    let items = state.restock
        .replenish_check(&retailer, inventory.low_stock_threshold, inventory.restock_target)
        .await?;

    Ok(Json(json!({ "success": true, "items": items })))
}
