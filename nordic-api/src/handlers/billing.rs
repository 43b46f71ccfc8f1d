use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use nordic_order::billing::BILL_MESSAGE;
use nordic_order::{BillLine, BillLineRequest};

use crate::error::AppError;
use crate::extract::{CurrentRetailer, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BillRequest {
    #[serde(default)]
    pub items: Vec<BillLineRequest>,
}

#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub success: bool,
    pub items: Vec<BillLine>,
    pub grand_total: f64,
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/bill/{user_id}", post(create_bill))
}

/// POST /bill/{user_id}
/// Sell each line against current stock and total the bill
pub async fn create_bill(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    JsonBody(req): JsonBody<BillRequest>,
) -> Result<Json<BillResponse>, AppError> {
    let bill = state.billing.bill(retailer.id, &req.items).await?;

    Ok(Json(BillResponse {
        success: true,
        items: bill.items,
        grand_total: bill.grand_total,
        message: BILL_MESSAGE.to_string(),
    }))
}
