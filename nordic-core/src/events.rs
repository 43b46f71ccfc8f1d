use async_trait::async_trait;
use serde::Serialize;

/// Outbound domain events. Delivery is best effort: implementations log
/// failures and callers never fail a request because of them.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_json(&self, topic: &str, key: &str, payload: serde_json::Value);
}

/// Serialize and publish an event. Serialization errors are logged.
pub async fn publish<E: Serialize + Sync>(publisher: &dyn EventPublisher, topic: &str, key: &str, event: &E) {
    match serde_json::to_value(event) {
        Ok(payload) => publisher.publish_json(topic, key, payload).await,
        Err(e) => tracing::error!("Failed to serialize event for {}: {}", topic, e),
    }
}

/// Publisher used when no broker is configured.
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish_json(&self, topic: &str, key: &str, _payload: serde_json::Value) {
        tracing::debug!("No event broker configured, dropping {} event for {}", topic, key);
    }
}
