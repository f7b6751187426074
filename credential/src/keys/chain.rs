use std::sync::Arc;

use async_trait::async_trait;

use super::provider::KeyProvider;
use super::provider::KeyProviderError;
use super::provider::SigningKey;
use crate::token::TokenKind;

/// Ordered fallback strategy over signing-key tiers.
///
/// Signing and rotation settle on the first tier that does not report
/// `Unavailable`, so a shared-store outage degrades transparently to the next
/// tier. Verification collects candidate keys from every reachable tier,
/// keeping tokens signed by a degraded instance verifiable on that instance.
/// Errors other than `Unavailable` stop the walk.
pub struct KeyProviderChain {
    tiers: Vec<Arc<dyn KeyProvider>>,
}

impl KeyProviderChain {
    /// Build a chain from tiers ordered most- to least-authoritative.
    pub fn new(tiers: Vec<Arc<dyn KeyProvider>>) -> Self {
        Self { tiers }
    }
}

#[async_trait]
impl KeyProvider for KeyProviderChain {
    async fn signing_key(&self, kind: TokenKind) -> Result<SigningKey, KeyProviderError> {
        let mut last_reason = None;
        for tier in &self.tiers {
            match tier.signing_key(kind).await {
                Ok(key) => return Ok(key),
                Err(KeyProviderError::Unavailable(reason)) => last_reason = Some(reason),
                Err(other) => return Err(other),
            }
        }
        Err(unavailable(last_reason))
    }

    async fn verification_keys(&self, kind: TokenKind) -> Result<Vec<SigningKey>, KeyProviderError> {
        let mut candidates: Vec<SigningKey> = Vec::new();
        let mut last_reason = None;
        for tier in &self.tiers {
            match tier.verification_keys(kind).await {
                Ok(keys) => {
                    for key in keys {
                        if !candidates.iter().any(|c| c.material() == key.material()) {
                            candidates.push(key);
                        }
                    }
                }
                Err(KeyProviderError::Unavailable(reason)) => last_reason = Some(reason),
                Err(other) => return Err(other),
            }
        }

        if candidates.is_empty() {
            Err(unavailable(last_reason))
        } else {
            Ok(candidates)
        }
    }

    async fn rotate(&self, kind: TokenKind) -> Result<(), KeyProviderError> {
        let mut last_reason = None;
        for tier in &self.tiers {
            match tier.rotate(kind).await {
                Ok(()) => return Ok(()),
                Err(KeyProviderError::Unavailable(reason)) => last_reason = Some(reason),
                Err(other) => return Err(other),
            }
        }
        Err(unavailable(last_reason))
    }
}

fn unavailable(last_reason: Option<String>) -> KeyProviderError {
    KeyProviderError::Unavailable(
        last_reason.unwrap_or_else(|| "no signing key tiers configured".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::keys::LocalKeyProvider;
    use crate::keys::StoreKeyProvider;
    use crate::store::CacheError;
    use crate::store::CacheStore;
    use crate::store::MemoryCacheStore;

    /// Store that refuses every call, as if the network were down.
    struct DownStore;

    #[async_trait]
    impl CacheStore for DownStore {
        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    fn two_tier<C: CacheStore>(store: Arc<C>) -> KeyProviderChain {
        let tiers: Vec<Arc<dyn KeyProvider>> = vec![
            Arc::new(StoreKeyProvider::new(store)),
            Arc::new(LocalKeyProvider::new()),
        ];
        KeyProviderChain::new(tiers)
    }

    #[tokio::test]
    async fn test_prefers_the_store_tier() {
        let store = Arc::new(MemoryCacheStore::new());
        let seed = StoreKeyProvider::new(Arc::clone(&store));
        seed.rotate(TokenKind::Access).await.unwrap();
        let stored = seed.signing_key(TokenKind::Access).await.unwrap();

        let chain = two_tier(store);
        let key = chain.signing_key(TokenKind::Access).await.unwrap();
        assert_eq!(key.material(), stored.material());
    }

    #[tokio::test]
    async fn test_falls_back_when_store_is_down() {
        let chain = two_tier(Arc::new(DownStore));

        // The local tier provisions lazily; signing and verification agree.
        let key = chain.signing_key(TokenKind::Access).await.unwrap();
        let candidates = chain.verification_keys(TokenKind::Access).await.unwrap();
        assert!(candidates
            .iter()
            .any(|c| c.material() == key.material()));
    }

    #[tokio::test]
    async fn test_verification_unions_tiers() {
        let store = Arc::new(MemoryCacheStore::new());
        let seed = StoreKeyProvider::new(Arc::clone(&store));
        seed.rotate(TokenKind::Access).await.unwrap();

        let chain = two_tier(store);
        let candidates = chain.verification_keys(TokenKind::Access).await.unwrap();
        // Store key first, then the local tier's lazily provisioned key.
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_rotate_degrades_to_local() {
        let chain = two_tier(Arc::new(DownStore));

        let before = chain.signing_key(TokenKind::Access).await.unwrap();
        chain.rotate(TokenKind::Access).await.unwrap();
        let after = chain.signing_key(TokenKind::Access).await.unwrap();
        assert_ne!(before.material(), after.material());
    }

    #[tokio::test]
    async fn test_empty_chain_is_unavailable() {
        let chain = KeyProviderChain::new(Vec::new());
        let result = chain.signing_key(TokenKind::Access).await;
        assert!(matches!(result, Err(KeyProviderError::Unavailable(_))));
    }
}
