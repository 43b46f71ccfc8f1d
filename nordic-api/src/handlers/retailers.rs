use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use nordic_core::models::NewRetailer;

use crate::error::AppError;
use crate::extract::JsonBody;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "Nordic Retail Backend";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRetailerRequest {
    #[serde(default)]
    pub username: String,
    pub email: Option<String>,
    pub region: Option<String>,
}

impl CreateRetailerRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() {
            return Err(AppError::ValidationError("Username is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRetailerResponse {
    pub message: String,
    pub user_id: Uuid,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/create-db", post(create_retailer))
}

/// GET /
pub async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "time": Utc::now().to_rfc3339(),
    }))
}

/// POST /create-db
/// Register a retailer; all later routes are scoped by the returned id
pub async fn create_retailer(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateRetailerRequest>,
) -> Result<(StatusCode, Json<CreateRetailerResponse>), AppError> {
    req.validate()?;

    let username = req.username.trim().to_string();
    let retailer = state.retailers
        .create_retailer(&NewRetailer {
            username: username.clone(),
            email: req.email.filter(|e| !e.trim().is_empty()),
            region: req.region.filter(|r| !r.trim().is_empty()),
        })
        .await
        .map_err(|e| match e {
            nordic_core::StoreError::Conflict(_) => AppError::ConflictError("User already exists".to_string()),
            other => other.into(),
        })?;

    tracing::info!("Created retailer {} ({})", retailer.username, retailer.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateRetailerResponse {
            message: format!("Database '{}' created", username),
            user_id: retailer.id,
        }),
    ))
}
