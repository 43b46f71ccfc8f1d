use redis::RedisResult;
use tracing::info;

use crate::app_config::RedisConfig;

/// Fixed-window request counter per client, kept in Redis so every API
/// instance shares the same budget.
#[derive(Clone)]
pub struct RateLimiter {
    client: redis::Client,
    limit: i64,
    window_seconds: i64,
}

impl RateLimiter {
    pub fn new(url: &str, config: &RedisConfig) -> RedisResult<Self> {
        let client = redis::Client::open(url)?;
        info!(
            "Rate limiting at {} requests per {}s",
            config.rate_limit_per_window, config.rate_limit_window_seconds
        );
        Ok(Self {
            client,
            limit: config.rate_limit_per_window,
            window_seconds: config.rate_limit_window_seconds.max(1),
        })
    }

    /// Count one request from `client_key` and report whether it is still
    /// inside the current window's budget.
    pub async fn allow(&self, client_key: &str) -> RedisResult<bool> {
        let key = window_key(client_key, chrono::Utc::now().timestamp(), self.window_seconds);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, self.window_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= self.limit)
    }
}

/// Keys roll over with the window so a burst cannot keep extending its own TTL.
fn window_key(client_key: &str, now_secs: i64, window_seconds: i64) -> String {
    format!("ratelimit:{}:{}", client_key, now_secs / window_seconds)
}
