use async_trait::async_trait;
use thiserror::Error;

use crate::outbound::events::CredentialEvent;

/// Error for event publishing operations.
#[derive(Debug, Clone, Error)]
pub enum EventPublisherError {
    #[error("Failed to serialize event: {0}")]
    SerializationFailed(String),

    #[error("Failed to publish event to broker: {0}")]
    PublishFailed(String),

    #[error("Connection to event broker failed: {0}")]
    ConnectionFailed(String),
}

/// Port for credential lifecycle notifications.
///
/// Consumed by the interface layer after registration, email verification,
/// password reset, and logout. Delivery is fire-and-forget: failures are
/// logged by the caller and never block the credential operation.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish a credential event.
    ///
    /// # Arguments
    /// * `event` - Event envelope carrying type and payload
    ///
    /// # Errors
    /// * `SerializationFailed` - Event serialization failed
    /// * `PublishFailed` - Failed to publish to broker
    /// * `ConnectionFailed` - Broker connection failed
    async fn publish(&self, event: &CredentialEvent) -> Result<(), EventPublisherError>;
}

/// Publish without blocking the credential operation.
///
/// Failures are logged and swallowed, per the fire-and-forget contract at
/// the interface boundary.
pub async fn publish_best_effort<P: EventPublisher>(publisher: &P, event: &CredentialEvent) {
    if let Err(e) = publisher.publish(event).await {
        tracing::error!(
            event_type = event.event_type(),
            user_id = %event.user_id(),
            error = %e,
            "Failed to publish credential event"
        );
    }
}
