//! Credential service composition layer
//!
//! Wires the `credential` core to its external collaborators: layered
//! configuration, the Redis-backed shared store, and the Kafka credential
//! event publisher. The inbound interface layer (HTTP) lives outside this
//! crate and consumes [`application::CredentialServices`] plus the
//! [`ports::EventPublisher`] port.

pub mod application;
pub mod config;
pub mod outbound;
pub mod ports;

pub use application::CredentialServices;
pub use config::Config;
