use std::sync::Arc;

use async_trait::async_trait;

use super::provider::KeyProvider;
use super::provider::KeyProviderError;
use super::provider::SigningKey;
use crate::store::CacheStore;
use crate::token::TokenKind;

/// Namespace prefix for signing keys in the shared store.
const SIGNING_KEY_PREFIX: &str = "signing_key";

fn store_key(kind: TokenKind) -> String {
    format!("{}:{}", SIGNING_KEY_PREFIX, kind)
}

/// Shared-store signing-key tier for multi-instance deployments.
///
/// Keys are held base64-encoded under `signing_key:{kind}` with no expiry.
/// The tier reports `Unavailable` when the store cannot be reached or holds
/// no key for the kind, letting a chain fall back to an in-process tier;
/// corrupt key material is a hard error instead.
///
/// Rotation has no cross-instance coordination: concurrent rotations resolve
/// by the store's last-writer-wins semantics.
pub struct StoreKeyProvider<C: CacheStore> {
    store: Arc<C>,
}

impl<C: CacheStore> StoreKeyProvider<C> {
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Seed the store with a key for `kind` if none exists yet.
    ///
    /// Meant for composition time, so every instance signs and verifies
    /// against the same material. Never overwrites an existing key.
    ///
    /// # Errors
    /// * `Unavailable` - Store unreachable; callers may degrade to a local tier
    pub async fn ensure_key(&self, kind: TokenKind) -> Result<(), KeyProviderError> {
        let existing = self
            .store
            .get(&store_key(kind))
            .await
            .map_err(|e| KeyProviderError::Unavailable(e.to_string()))?;
        if existing.is_none() {
            self.rotate(kind).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<C: CacheStore> KeyProvider for StoreKeyProvider<C> {
    async fn signing_key(&self, kind: TokenKind) -> Result<SigningKey, KeyProviderError> {
        let encoded = self
            .store
            .get(&store_key(kind))
            .await
            .map_err(|e| KeyProviderError::Unavailable(e.to_string()))?
            .ok_or_else(|| {
                KeyProviderError::Unavailable(format!("no {} signing key in shared store", kind))
            })?;
        SigningKey::from_encoded(kind, &encoded)
    }

    async fn verification_keys(&self, kind: TokenKind) -> Result<Vec<SigningKey>, KeyProviderError> {
        Ok(vec![self.signing_key(kind).await?])
    }

    async fn rotate(&self, kind: TokenKind) -> Result<(), KeyProviderError> {
        let fresh = SigningKey::generate(kind)?;
        self.store
            .set(&store_key(kind), &fresh.encoded(), None)
            .await
            .map_err(|e| KeyProviderError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
