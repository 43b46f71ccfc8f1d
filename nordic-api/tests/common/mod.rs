#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use nordic_api::{app, AppState, Repositories};
use nordic_catalog::SeededDemandModel;
use nordic_core::events::NoopPublisher;
use nordic_core::forecast::{DemandForecaster, Forecast, ForecastError, ForecastQuery};
use nordic_store::app_config::{Config, DatabaseConfig, ServerConfig};

/// Config with defaults everywhere and no external services.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig { port: 0 },
        database: DatabaseConfig { url: "postgres://unused".to_string(), max_connections: 1 },
        redis: Default::default(),
        kafka: Default::default(),
        forecast: Default::default(),
        pricing: Default::default(),
        inventory: Default::default(),
    }
}

/// Router over the in-memory store with the seeded demand model.
pub fn build_test_app() -> Router {
    build_test_app_with(Arc::new(SeededDemandModel::new()))
}

pub fn build_test_app_with(forecaster: Arc<dyn DemandForecaster>) -> Router {
    let state = AppState::new(
        test_config(),
        Repositories::in_memory(),
        forecaster,
        Arc::new(NoopPublisher),
        None,
    );
    app(state)
}

/// Forecast provider that is always down.
pub struct DownForecaster;

#[async_trait]
impl DemandForecaster for DownForecaster {
    async fn forecast(&self, _query: &ForecastQuery) -> Result<Forecast, ForecastError> {
        Err(ForecastError::Unavailable("connection refused".to_string()))
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

/// Create a retailer and return its id.
pub async fn create_retailer(app: &Router, username: &str, region: Option<&str>) -> String {
    let (status, json) = post(
        app,
        "/create-db",
        serde_json::json!({ "username": username, "region": region }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    json["userId"].as_str().unwrap().to_string()
}

pub async fn add_item(app: &Router, user_id: &str, body: Value) {
    let (status, json) = post(app, &format!("/add-item/{}", user_id), body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
}
