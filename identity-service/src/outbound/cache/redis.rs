use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use credential::store::CacheError;
use credential::store::CacheStore;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;

use crate::config::RedisConfig;

/// Redis-backed [`CacheStore`].
///
/// Every round trip runs under the configured timeout; a timeout is reported
/// as `Unavailable`, the same as any transport failure, and never as a
/// missing key. The connection manager reconnects on its own, so one instance
/// is shared across all credential operations.
pub struct RedisCacheStore {
    connection: ConnectionManager,
    timeout: Duration,
}

impl RedisCacheStore {
    /// Open a managed connection to the shared store.
    pub async fn connect(config: &RedisConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(url = %config.url, "Connecting to Redis shared store");

        let client = Client::open(config.url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection,
            timeout: config.operation_timeout(),
        })
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T, redis::RedisError>> + Send,
    ) -> Result<T, CacheError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(operation, error = %e, "Redis operation failed");
                Err(CacheError::Unavailable(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Redis operation timed out"
                );
                Err(CacheError::Unavailable(format!("{} timed out", operation)))
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        match ttl {
            Some(ttl) => {
                // Redis rejects a zero expiry; clamp to the shortest TTL.
                let seconds = ttl.as_secs().max(1);
                self.bounded("SETEX", connection.set_ex(key, value, seconds))
                    .await
            }
            None => self.bounded("SET", connection.set(key, value)).await,
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        self.bounded("GET", connection.get(key)).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        self.bounded("DEL", connection.del(key)).await
    }
}
