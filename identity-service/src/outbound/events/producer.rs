use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;

use crate::config::KafkaConfig;
use crate::outbound::events::messages::CredentialEvent;
use crate::ports::EventPublisher;
use crate::ports::EventPublisherError;

/// Kafka-backed credential event publisher.
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaEventPublisher {
    /// Create a new Kafka publisher with "at least once" delivery semantics
    ///
    /// # Notes:
    /// - `acks=all`: Wait for all in-sync replicas to acknowledge
    /// - `enable.idempotence=true`: Prevents duplicate messages during retries
    /// - `retry.backoff.ms=100`: Backoff between retry attempts
    pub fn new(config: &KafkaConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.brokers,
            topic = %config.topic,
            "Initializing Kafka producer for credential events"
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "30000")
            .set("compression.type", "gzip")
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "10")
            .set("retry.backoff.ms", "100")
            .create()?;

        Ok(Self {
            producer,
            topic: config.topic.to_string(),
            timeout: Duration::from_secs(30),
        })
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish(&self, event: &CredentialEvent) -> Result<(), EventPublisherError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| EventPublisherError::SerializationFailed(e.to_string()))?;
        let key = event.user_id().to_string();

        tracing::debug!(
            topic = %self.topic,
            event_type = event.event_type(),
            user_id = %key,
            "Publishing credential event"
        );

        let record = FutureRecord::to(&self.topic)
            .key(&key) // Partition by user for per-user ordering
            .payload(&payload);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| ())
            .map_err(|(e, _)| {
                tracing::error!(
                    topic = %self.topic,
                    event_type = event.event_type(),
                    error = %e,
                    "Failed to publish credential event after all retries"
                );
                EventPublisherError::PublishFailed(e.to_string())
            })
    }
}
