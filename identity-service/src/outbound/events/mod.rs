pub mod messages;
pub mod producer;

pub use messages::CredentialEvent;
pub use producer::KafkaEventPublisher;
