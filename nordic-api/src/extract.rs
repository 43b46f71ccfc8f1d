use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::http::request::Parts;
use axum::Json;
use uuid::Uuid;

use nordic_core::models::Retailer;

use crate::error::AppError;
use crate::state::AppState;

/// `Json<T>` whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// `Query<T>` whose rejections use the API error body.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// The retailer named by the `{user_id}` path segment.
pub struct CurrentRetailer(pub Retailer);

impl FromRequestParts<AppState> for CurrentRetailer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await?;

        let raw = params
            .get("user_id")
            .ok_or_else(|| AppError::ValidationError("Missing user id".to_string()))?;
        let id = Uuid::parse_str(raw)
            .map_err(|_| AppError::ValidationError(format!("Invalid user id '{}'", raw)))?;

        let retailer = state.retailers
            .get_retailer(id)
            .await?
            .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

        Ok(Self(retailer))
    }
}
