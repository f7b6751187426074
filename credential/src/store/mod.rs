pub mod memory;

pub use memory::MemoryCacheStore;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for shared-store operations.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The store could not be reached or did not answer in time.
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

/// Port for the shared key/value store backing revocation markers and
/// distributed signing keys.
///
/// A read that finds nothing is `Ok(None)`, never an error; `Unavailable` is
/// reserved for transport failures so callers can fail closed on them.
/// Implementations apply their own bounded per-call timeout and report a
/// timeout as `Unavailable`.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Store `value` under `key`, expiring after `ttl` when one is given.
    ///
    /// # Errors
    /// * `Unavailable` - Store unreachable or timed out
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Fetch the value stored under `key`.
    ///
    /// # Returns
    /// The stored value, or `None` when the key is absent or expired
    ///
    /// # Errors
    /// * `Unavailable` - Store unreachable or timed out
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// * `Unavailable` - Store unreachable or timed out
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
