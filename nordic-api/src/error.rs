use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use nordic_core::forecast::ForecastError;
use nordic_core::StoreError;
use nordic_order::{BillingError, PricingError, RestockError};

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    UpstreamError(String),
    PersistenceError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFoundError(_) => "NOT_FOUND",
            AppError::ConflictError(_) => "CONFLICT",
            AppError::UpstreamError(_) => "UPSTREAM_ERROR",
            AppError::PersistenceError(_) => "PERSISTENCE_ERROR",
            AppError::InternalServerError(_) | AppError::Anyhow(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UpstreamError(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::PersistenceError(msg) => {
                tracing::error!("Persistence failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not persist new price".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFoundError(msg),
            StoreError::Conflict(msg) => AppError::ConflictError(msg),
            StoreError::Backend(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::UpstreamError(err.to_string())
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::EmptyBill => AppError::ValidationError(err.to_string()),
            BillingError::Store(e) => e.into(),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Validation(msg) => AppError::ValidationError(msg),
            PricingError::Store(e) => e.into(),
            PricingError::Persistence(e) => AppError::PersistenceError(e.to_string()),
        }
    }
}

impl From<RestockError> for AppError {
    fn from(err: RestockError) -> Self {
        match err {
            RestockError::Validation(msg) => AppError::ValidationError(msg),
            RestockError::NoDistributor(_) => AppError::NotFoundError(err.to_string()),
            RestockError::Store(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::from(StoreError::Conflict("x".into())).code(), "CONFLICT");
        assert_eq!(
            AppError::from(PricingError::Persistence(StoreError::Backend("down".into()))).code(),
            "PERSISTENCE_ERROR"
        );
        assert_eq!(AppError::from(ForecastError::Unavailable("refused".into())).code(), "UPSTREAM_ERROR");
        assert_eq!(AppError::from(RestockError::NoDistributor("Oslo".into())).code(), "NOT_FOUND");
    }

    #[test]
    fn test_status_mapping() {
        let response = AppError::ValidationError("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::UpstreamError("down".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = AppError::PersistenceError("write failed".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
