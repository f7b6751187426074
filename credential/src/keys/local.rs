use std::collections::HashMap;
use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::provider::KeyProvider;
use super::provider::KeyProviderError;
use super::provider::SigningKey;
use crate::token::TokenKind;

/// In-process signing-key tier.
///
/// Keys live in a reader/writer-locked map with one slot per token kind.
/// Concurrent reads proceed in parallel; rotation holds the exclusive lock
/// only across the map mutation. The slot retains up to `history` keys
/// (newest first), so validation can still accept tokens signed just before
/// a rotation.
///
/// With the default history of 1, rotation makes every token signed under the
/// prior key unverifiable immediately.
pub struct LocalKeyProvider {
    keys: RwLock<HashMap<TokenKind, VecDeque<SigningKey>>>,
    history: usize,
}

impl LocalKeyProvider {
    /// Provider that keeps only the current key per kind.
    pub fn new() -> Self {
        Self::with_history(1)
    }

    /// Provider that retains up to `history` keys per kind (at least one).
    pub fn with_history(history: usize) -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            history: history.max(1),
        }
    }

    async fn provision(&self, kind: TokenKind) -> Result<SigningKey, KeyProviderError> {
        // Generate outside the exclusive section; entropy reads can block.
        let fresh = SigningKey::generate(kind)?;

        let mut keys = self.keys.write().await;
        let slot = keys.entry(kind).or_default();
        if let Some(current) = slot.front() {
            // Another task provisioned while we were generating.
            return Ok(current.clone());
        }
        slot.push_front(fresh.clone());
        Ok(fresh)
    }
}

impl Default for LocalKeyProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyProvider for LocalKeyProvider {
    async fn signing_key(&self, kind: TokenKind) -> Result<SigningKey, KeyProviderError> {
        {
            let keys = self.keys.read().await;
            if let Some(current) = keys.get(&kind).and_then(|slot| slot.front()) {
                return Ok(current.clone());
            }
        }
        self.provision(kind).await
    }

    async fn verification_keys(&self, kind: TokenKind) -> Result<Vec<SigningKey>, KeyProviderError> {
        {
            let keys = self.keys.read().await;
            if let Some(slot) = keys.get(&kind) {
                if !slot.is_empty() {
                    return Ok(slot.iter().cloned().collect());
                }
            }
        }
        Ok(vec![self.provision(kind).await?])
    }

    async fn rotate(&self, kind: TokenKind) -> Result<(), KeyProviderError> {
        let fresh = SigningKey::generate(kind)?;

        let mut keys = self.keys.write().await;
        let slot = keys.entry(kind).or_default();
        slot.push_front(fresh);
        slot.truncate(self.history);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_access_provisions() {
        let provider = LocalKeyProvider::new();

        let first = provider.signing_key(TokenKind::Access).await.unwrap();
        let second = provider.signing_key(TokenKind::Access).await.unwrap();
        assert_eq!(first.material(), second.material());
    }

    #[tokio::test]
    async fn test_kinds_get_distinct_keys() {
        let provider = LocalKeyProvider::new();

        let access = provider.signing_key(TokenKind::Access).await.unwrap();
        let refresh = provider.signing_key(TokenKind::Refresh).await.unwrap();
        assert_ne!(access.material(), refresh.material());
    }

    #[tokio::test]
    async fn test_rotation_discards_prior_key_by_default() {
        let provider = LocalKeyProvider::new();

        let before = provider.signing_key(TokenKind::Access).await.unwrap();
        provider.rotate(TokenKind::Access).await.unwrap();
        let after = provider.signing_key(TokenKind::Access).await.unwrap();

        assert_ne!(before.material(), after.material());
        let candidates = provider.verification_keys(TokenKind::Access).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].material(), after.material());
    }

    #[tokio::test]
    async fn test_history_retains_previous_key() {
        let provider = LocalKeyProvider::with_history(2);

        let first = provider.signing_key(TokenKind::Access).await.unwrap();
        provider.rotate(TokenKind::Access).await.unwrap();

        let candidates = provider.verification_keys(TokenKind::Access).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].material(), first.material());

        // A second rotation pushes the first key out of the window.
        provider.rotate(TokenKind::Access).await.unwrap();
        let candidates = provider.verification_keys(TokenKind::Access).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|k| k.material() != first.material()));
    }

    #[tokio::test]
    async fn test_rotation_only_touches_its_kind() {
        let provider = LocalKeyProvider::new();

        let reset = provider.signing_key(TokenKind::Reset).await.unwrap();
        provider.rotate(TokenKind::Access).await.unwrap();
        let reset_after = provider.signing_key(TokenKind::Reset).await.unwrap();
        assert_eq!(reset.material(), reset_after.material());
    }

    #[tokio::test]
    async fn test_concurrent_first_access_converges() {
        use std::sync::Arc;

        let provider = Arc::new(LocalKeyProvider::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let provider = Arc::clone(&provider);
            handles.push(tokio::spawn(async move {
                provider.signing_key(TokenKind::Access).await.unwrap()
            }));
        }

        let mut materials = Vec::new();
        for handle in handles {
            materials.push(handle.await.unwrap().material().to_vec());
        }
        assert!(materials.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
