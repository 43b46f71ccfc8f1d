use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use tracing::{debug, warn};

use nordic_core::events::EventPublisher;

use crate::app_config::KafkaConfig;

/// Publishes stock, price and restock events to Kafka.
#[derive(Clone)]
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    queue_timeout: Duration,
}

impl KafkaEventPublisher {
    pub fn new(brokers: &str, config: &KafkaConfig) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", config.delivery_timeout_ms.to_string())
            .create()?;

        Ok(Self {
            producer,
            queue_timeout: Duration::from_millis(config.delivery_timeout_ms),
        })
    }

    /// Send one record keyed by the aggregate it describes.
    pub async fn send(&self, topic: &str, key: &str, payload: &str) -> Result<(), KafkaError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        let delivery = self
            .producer
            .send(record, Timeout::After(self.queue_timeout))
            .await
            .map_err(|(e, _)| e)?;
        debug!("{} event for {} stored at {}:{}", topic, key, delivery.partition, delivery.offset);
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish_json(&self, topic: &str, key: &str, payload: serde_json::Value) {
        // Events are notifications; a lost one never fails the request
        if let Err(e) = self.send(topic, key, &payload.to_string()).await {
            warn!("Dropped {} event for {}: {}", topic, key, e);
        }
    }
}
