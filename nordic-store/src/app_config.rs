use serde::Deserialize;
use std::env;

use nordic_catalog::PricingConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

/// Rate limiting is disabled when no URL is set.
#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: Option<String>,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_window: i64,
    #[serde(default = "default_rate_window")]
    pub rate_limit_window_seconds: i64,
}

fn default_rate_limit() -> i64 { 100 }
fn default_rate_window() -> i64 { 60 }

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            rate_limit_per_window: default_rate_limit(),
            rate_limit_window_seconds: default_rate_window(),
        }
    }
}

/// Events are dropped when no brokers are set.
#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: Option<String>,
    #[serde(default = "default_kafka_client_id")]
    pub client_id: String,
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_ms: u64,
}

fn default_kafka_client_id() -> String { "nordic-retail-api".to_string() }
fn default_delivery_timeout() -> u64 { 5000 }

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: None,
            client_id: default_kafka_client_id(),
            delivery_timeout_ms: default_delivery_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Base URL of the forecast service; the seeded model is used when unset.
    pub service_url: Option<String>,
    #[serde(default = "default_forecast_timeout")]
    pub timeout_ms: u64,
    /// Demand used when the forecast is unavailable and there is no sales history.
    #[serde(default = "default_fallback_demand")]
    pub fallback_demand: f64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: usize,
    #[serde(default = "default_reset_seconds")]
    pub reset_timeout_seconds: u64,
}

fn default_forecast_timeout() -> u64 { 3000 }
fn default_fallback_demand() -> f64 { 300.0 }
fn default_failure_threshold() -> usize { 5 }
fn default_reset_seconds() -> u64 { 30 }

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            timeout_ms: default_forecast_timeout(),
            fallback_demand: default_fallback_demand(),
            failure_threshold: default_failure_threshold(),
            reset_timeout_seconds: default_reset_seconds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
    /// Units a replenishment order tops a product up to.
    #[serde(default = "default_restock_target")]
    pub restock_target: i64,
}

fn default_low_stock_threshold() -> i64 { 20 }
fn default_restock_target() -> i64 { 100 }

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
            restock_target: default_restock_target(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `NORDIC__DATABASE__URL=postgres://...`
            .add_source(config::Environment::with_prefix("NORDIC").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
