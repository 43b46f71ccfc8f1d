//! Test doubles shared by the service tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use nordic_catalog::{SaleOutcome, StockKey, StockRecord};
use nordic_core::events::EventPublisher;
use nordic_core::forecast::{DemandForecaster, Forecast, ForecastError, ForecastQuery};
use nordic_core::models::StockFilter;
use nordic_core::repository::StockRepository;
use nordic_core::{StoreError, StoreResult};
use nordic_store::MemoryStore;

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingPublisher {
    pub async fn topics(&self) -> Vec<String> {
        self.published.lock().await.iter().map(|(t, _)| t.clone()).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish_json(&self, topic: &str, _key: &str, payload: serde_json::Value) {
        self.published.lock().await.push((topic.to_string(), payload));
    }
}

pub struct FixedForecaster(pub f64);

#[async_trait]
impl DemandForecaster for FixedForecaster {
    async fn forecast(&self, _query: &ForecastQuery) -> Result<Forecast, ForecastError> {
        Ok(Forecast { forecasted_sales: self.0, suggested_stock: self.0, source: "fixed".into() })
    }
}

pub struct FailingForecaster;

#[async_trait]
impl DemandForecaster for FailingForecaster {
    async fn forecast(&self, _query: &ForecastQuery) -> Result<Forecast, ForecastError> {
        Err(ForecastError::Unavailable("connection refused".into()))
    }
}

/// Reads pass through; every write fails.
pub struct ReadOnlyStock(pub Arc<MemoryStore>);

#[async_trait]
impl StockRepository for ReadOnlyStock {
    async fn get_stock(&self, key: &StockKey) -> StoreResult<Option<StockRecord>> {
        self.0.get_stock(key).await
    }

    async fn list_stock(&self, retailer_id: Uuid, filter: &StockFilter) -> StoreResult<Vec<StockRecord>> {
        self.0.list_stock(retailer_id, filter).await
    }

    async fn set_price(&self, _key: &StockKey, _price: f64) -> StoreResult<bool> {
        Err(StoreError::Backend("read-only replica".into()))
    }

    async fn sell(&self, _key: &StockKey, _quantity: i64) -> StoreResult<SaleOutcome> {
        Err(StoreError::Backend("read-only replica".into()))
    }

    async fn low_stock(&self, retailer_id: Uuid, threshold: i64) -> StoreResult<Vec<StockRecord>> {
        self.0.low_stock(retailer_id, threshold).await
    }
}
