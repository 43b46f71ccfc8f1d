use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nordic_api::{app, AppState, Repositories};
use nordic_catalog::SeededDemandModel;
use nordic_core::events::{EventPublisher, NoopPublisher};
use nordic_core::forecast::DemandForecaster;
use nordic_store::app_config::Config;
use nordic_store::{DbClient, HttpForecastClient, KafkaEventPublisher, RateLimiter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nordic_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Nordic Retail API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;
    let repos = Repositories::postgres(db.pool.clone());

    // Redis (optional)
    let rate_limiter = match config.redis.url.as_deref() {
        Some(url) => Some(Arc::new(
            RateLimiter::new(url, &config.redis).context("Failed to create Redis client")?,
        )),
        None => {
            tracing::warn!("No Redis configured, rate limiting disabled");
            None
        }
    };

    // Kafka (optional)
    let events: Arc<dyn EventPublisher> = match config.kafka.brokers.as_deref() {
        Some(brokers) => Arc::new(
            KafkaEventPublisher::new(brokers, &config.kafka).context("Failed to create Kafka producer")?,
        ),
        None => {
            tracing::warn!("No Kafka brokers configured, domain events will be dropped");
            Arc::new(NoopPublisher)
        }
    };

    // Forecast provider
    let forecaster: Arc<dyn DemandForecaster> = match config.forecast.service_url.as_deref() {
        Some(url) => {
            tracing::info!("Using forecast service at {}", url);
            Arc::new(
                HttpForecastClient::new(url, Duration::from_millis(config.forecast.timeout_ms))
                    .context("Failed to build forecast client")?,
            )
        }
        None => {
            tracing::info!("No forecast service configured, using seeded demand model");
            Arc::new(SeededDemandModel::new())
        }
    };

    let port = config.server.port;
    let app_state = AppState::new(config, repos, forecaster, events, rate_limiter);
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
