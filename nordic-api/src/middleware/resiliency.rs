use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use nordic_core::forecast::{DemandForecaster, Forecast, ForecastError, ForecastQuery};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing fast
    HalfOpen, // One trial call allowed
}

pub struct CircuitBreaker {
    pub name: String,
    state: RwLock<CircuitState>,
    failure_count: AtomicUsize,
    failure_threshold: usize,
    reset_timeout: Duration,
    last_failure: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicUsize::new(0),
            failure_threshold: threshold.max(1),
            reset_timeout: timeout,
            last_failure: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> CircuitState {
        *self.state.read().await
    }

    /// Whether a call may go through right now. After the reset timeout one
    /// caller gets the half-open trial; the rest fail fast until it reports
    /// back, or until another timeout passes without a report.
    pub async fn check(&self) -> bool {
        if *self.state.read().await == CircuitState::Closed {
            return true;
        }

        let mut state = self.state.write().await;
        let mut last_fail = self.last_failure.write().await;
        match *state {
            CircuitState::Closed => true,
            CircuitState::Open | CircuitState::HalfOpen => match *last_fail {
                Some(instant) if instant.elapsed() >= self.reset_timeout => {
                    if *state == CircuitState::Open {
                        tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
                    }
                    *state = CircuitState::HalfOpen;
                    *last_fail = Some(Instant::now());
                    true
                }
                _ => false,
            },
        }
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        if *state == CircuitState::HalfOpen {
            *state = CircuitState::Closed;
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        }
        self.failure_count.store(0, Ordering::SeqCst);
    }

    pub async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;

        if count >= self.failure_threshold || *state == CircuitState::HalfOpen {
            *state = CircuitState::Open;
            *self.last_failure.write().await = Some(Instant::now());
            tracing::error!("Circuit Breaker [{}] TRIPPED to Open. Failures: {}", self.name, count);
        }
    }
}

/// Forecaster that fails fast while the upstream keeps failing.
pub struct GuardedForecaster {
    inner: Arc<dyn DemandForecaster>,
    breaker: CircuitBreaker,
}

impl GuardedForecaster {
    pub fn new(inner: Arc<dyn DemandForecaster>, breaker: CircuitBreaker) -> Self {
        Self { inner, breaker }
    }
}

#[async_trait]
impl DemandForecaster for GuardedForecaster {
    async fn forecast(&self, query: &ForecastQuery) -> Result<Forecast, ForecastError> {
        if !self.breaker.check().await {
            return Err(ForecastError::Unavailable(format!(
                "Circuit Breaker [{}] is OPEN",
                self.breaker.name
            )));
        }

        let result = self.inner.forecast(query).await;
        match &result {
            // A service that answers with an error is still reachable
            Ok(_) | Err(ForecastError::Rejected(_)) => self.breaker.record_success().await,
            Err(_) => self.breaker.record_failure().await,
        }
        result
    }
}
