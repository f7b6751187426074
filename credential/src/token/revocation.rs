use std::sync::Arc;
use std::time::Duration;

use sha2::Digest;
use sha2::Sha256;

use crate::store::CacheError;
use crate::store::CacheStore;

/// Namespace prefix for revocation markers in the shared store.
const REVOKED_TOKEN_PREFIX: &str = "revoked_token";

/// Marker value; only the key's existence matters.
const REVOKED_MARKER: &str = "1";

/// Stable lookup fingerprint for a serialized token.
///
/// SHA-256 of the token, hex-encoded, so store keys stay bounded and never
/// carry the token itself.
pub fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Registry of revoked token fingerprints.
///
/// Markers live under `revoked_token:{fingerprint}` with a TTL at or before
/// the token's own expiry, so the registry never outgrows the set of tokens
/// that could still be replayed. The store is a required capability with no
/// fallback: lookups fail closed, a store failure surfaces as an error and is
/// never read as "not revoked".
pub struct RevocationRegistry<C: CacheStore> {
    store: Arc<C>,
}

impl<C: CacheStore> RevocationRegistry<C> {
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Record `token` as revoked for `ttl`. Idempotent.
    ///
    /// # Errors
    /// * `Unavailable` - Store unreachable; the token is NOT revoked
    pub async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), CacheError> {
        self.store
            .set(&marker_key(token), REVOKED_MARKER, Some(ttl))
            .await
    }

    /// Check whether `token` has been revoked.
    ///
    /// # Errors
    /// * `Unavailable` - Store unreachable; revocation status is unknown and
    ///   the caller must not authorize
    pub async fn is_revoked(&self, token: &str) -> Result<bool, CacheError> {
        Ok(self.store.get(&marker_key(token)).await?.is_some())
    }
}

fn marker_key(token: &str) -> String {
    format!("{}:{}", REVOKED_TOKEN_PREFIX, fingerprint(token))
}
