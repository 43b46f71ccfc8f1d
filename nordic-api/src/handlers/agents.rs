use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use nordic_core::models::{NewDeliveryAgent, NewDistributor};

use crate::error::AppError;
use crate::extract::{CurrentRetailer, JsonBody, QueryParams};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddAgentRequest {
    #[serde(default)]
    pub delivery_name: String,
    #[serde(default)]
    pub delivery_number: String,
    #[serde(default)]
    pub location: String,
}

impl AddAgentRequest {
    fn validate(self) -> Result<NewDeliveryAgent, AppError> {
        if [&self.delivery_name, &self.delivery_number, &self.location].iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::ValidationError(
                "Missing required fields: delivery_name, delivery_number, location".to_string(),
            ));
        }
        Ok(NewDeliveryAgent {
            delivery_name: self.delivery_name.trim().to_string(),
            delivery_number: self.delivery_number.trim().to_string(),
            location: self.location.trim().to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddDistributorsRequest {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub distributors: Vec<NewDistributor>,
}

impl AddDistributorsRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.location.trim().is_empty() || self.distributors.is_empty() {
            return Err(AppError::ValidationError("location and distributors[] are required".to_string()));
        }
        if self.distributors.iter().any(|d| d.name.trim().is_empty() || d.contact.trim().is_empty()) {
            return Err(AppError::ValidationError("every distributor needs a name and contact".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/addDeliveryAgent/{user_id}", post(add_agent))
        .route("/getDeliveryAgents/{user_id}", get(list_agents))
        .route("/getDeliveryAgentsByLocation/{user_id}/{location}", get(agents_by_location))
        .route("/distributors", post(add_distributors).get(list_distributors))
}

/// POST /addDeliveryAgent/{user_id}
pub async fn add_agent(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    JsonBody(req): JsonBody<AddAgentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let agent = req.validate()?;
    let created = state.agents.add_agent(retailer.id, &agent).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Delivery Agent added successfully for {}", created.location),
            "agentId": created.id,
        })),
    ))
}

/// GET /getDeliveryAgents/{user_id}?location=
pub async fn list_agents(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    QueryParams(query): QueryParams<LocationQuery>,
) -> Result<Json<Value>, AppError> {
    let location = query.location.as_deref().map(str::trim).filter(|l| !l.is_empty());
    let agents = state.agents.list_agents(retailer.id, location).await?;
    Ok(Json(json!({ "agents": agents })))
}

/// GET /getDeliveryAgentsByLocation/{user_id}/{location}
pub async fn agents_by_location(
    State(state): State<AppState>,
    CurrentRetailer(retailer): CurrentRetailer,
    Path((_, location)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let agents = state.agents.list_agents(retailer.id, Some(location.trim())).await?;

    if agents.is_empty() {
        let body = Json(json!({ "message": format!("No agents found in {}", location) }));
        return Ok((StatusCode::NOT_FOUND, body).into_response());
    }

    Ok(Json(json!({ "location": location, "agents": agents })).into_response())
}

/// POST /distributors
/// Register distributors serving a city
pub async fn add_distributors(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AddDistributorsRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    req.validate()?;
    let created = state.distributors.add_distributors(req.location.trim(), &req.distributors).await?;

    tracing::info!("Added {} distributor(s) for {}", created.len(), req.location.trim());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} distributor(s) added for {}", created.len(), req.location.trim()),
            "distributors": created,
        })),
    ))
}

/// GET /distributors?location=
pub async fn list_distributors(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LocationQuery>,
) -> Result<Json<Value>, AppError> {
    let location = query.location.as_deref().map(str::trim).filter(|l| !l.is_empty());
    let distributors = state.distributors.list_distributors(location).await?;
    Ok(Json(json!({ "distributors": distributors })))
}
