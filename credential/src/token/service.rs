use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use crate::keys::KeyProvider;
use crate::keys::KeyProviderError;
use crate::keys::SigningKey;
use crate::store::CacheStore;
use crate::token::claims::Identity;
use crate::token::claims::TokenClaims;
use crate::token::claims::TokenKind;
use crate::token::errors::TokenError;
use crate::token::revocation::RevocationRegistry;

/// Validity durations per token kind.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access: Duration,
    pub refresh: Duration,
    pub reset: Duration,
    pub verification: Duration,
}

impl TokenConfig {
    pub fn duration(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
            TokenKind::Reset => self.reset,
            TokenKind::Verification => self.verification,
        }
    }
}

impl Default for TokenConfig {
    /// 15 minutes access, 7 days refresh, 24 hours reset, 72 hours
    /// verification.
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
            reset: Duration::hours(24),
            verification: Duration::hours(72),
        }
    }
}

/// Issues, validates, and revokes signed bearer tokens.
///
/// Signing material comes from the injected key provider; revocation state
/// from the registry. A token is valid iff its signature verifies under a key
/// currently associated with its kind, it has not expired, its embedded kind
/// matches the requested one, and it has not been revoked.
pub struct TokenService<P, C>
where
    P: KeyProvider,
    C: CacheStore,
{
    config: TokenConfig,
    keys: Arc<P>,
    revocations: RevocationRegistry<C>,
}

impl<P, C> TokenService<P, C>
where
    P: KeyProvider,
    C: CacheStore,
{
    /// Create a new token service with injected dependencies.
    ///
    /// # Arguments
    /// * `config` - Validity durations per token kind
    /// * `keys` - Signing-key provider (single tier or fallback chain)
    /// * `revocations` - Revocation registry; required, no fallback
    pub fn new(config: TokenConfig, keys: Arc<P>, revocations: RevocationRegistry<C>) -> Self {
        Self {
            config,
            keys,
            revocations,
        }
    }

    /// Issue a signed token of `kind` for `identity`.
    ///
    /// Stamps issued-at now and expiry after the kind's configured duration.
    ///
    /// # Errors
    /// * `StoreUnavailable` - No signing-key tier could serve
    /// * `SigningFailed` - Key generation or token encoding failed
    pub async fn issue(&self, identity: &Identity, kind: TokenKind) -> Result<String, TokenError> {
        let claims = TokenClaims::stamp(identity, kind, Utc::now(), self.config.duration(kind));
        let key = self
            .keys
            .signing_key(kind)
            .await
            .map_err(issuance_error)?;

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.material()),
        )
        .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Validate `token` as a live token of `expected_kind` and return its
    /// claims.
    ///
    /// Check order: revocation (fail-closed), signature, expiry, embedded
    /// kind. Only HMAC/HS256 tokens are accepted; any other declared signing
    /// method is rejected outright.
    ///
    /// # Errors
    /// * `Revoked` - The token was revoked
    /// * `InvalidToken` - Malformed, bad signature, wrong algorithm, or wrong kind
    /// * `Expired` - The token is past its expiry
    /// * `StoreUnavailable` - Revocation status or keys could not be determined
    pub async fn validate(
        &self,
        token: &str,
        expected_kind: TokenKind,
    ) -> Result<TokenClaims, TokenError> {
        let revoked = self
            .revocations
            .is_revoked(token)
            .await
            .map_err(|e| TokenError::StoreUnavailable(e.to_string()))?;
        if revoked {
            return Err(TokenError::Revoked);
        }

        let keys = self
            .keys
            .verification_keys(expected_kind)
            .await
            .map_err(|e| TokenError::StoreUnavailable(e.to_string()))?;
        let claims = decode_with_any(token, &keys)?;

        if claims.is_expired(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }
        if claims.kind != expected_kind {
            return Err(TokenError::InvalidToken(format!(
                "token kind {} does not match expected {}",
                claims.kind, expected_kind
            )));
        }

        Ok(claims)
    }

    /// Revoke `token` until it would have expired anyway. Idempotent.
    ///
    /// # Errors
    /// * `StoreUnavailable` - The marker could not be written; the token is
    ///   NOT revoked
    pub async fn revoke(&self, token: &str) -> Result<(), TokenError> {
        self.revocations
            .revoke(token, self.revocation_ttl(token))
            .await
            .map_err(|e| TokenError::StoreUnavailable(e.to_string()))
    }

    /// Marker TTL: the token's remaining lifetime when its payload is
    /// readable, otherwise the access-token duration as the conservative
    /// default.
    fn revocation_ttl(&self, token: &str) -> StdDuration {
        match decode_unverified(token) {
            Some(claims) => {
                let remaining = claims.remaining_seconds(Utc::now().timestamp());
                StdDuration::from_secs(remaining.max(1) as u64)
            }
            None => self
                .config
                .access
                .to_std()
                .unwrap_or_else(|_| StdDuration::from_secs(1)),
        }
    }
}

fn issuance_error(error: KeyProviderError) -> TokenError {
    match error {
        KeyProviderError::GenerationFailed(reason) => TokenError::SigningFailed(reason),
        other => TokenError::StoreUnavailable(other.to_string()),
    }
}

fn hs256_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry and kind are checked explicitly after signature verification so
    // each failure maps to its own error.
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    validation
}

/// Try every candidate key, newest first; signature failures on all of them
/// mean the token is invalid (wrong key, tampered, or foreign algorithm).
fn decode_with_any(token: &str, keys: &[SigningKey]) -> Result<TokenClaims, TokenError> {
    let validation = hs256_validation();
    let mut last_error = None;
    for key in keys {
        match decode::<TokenClaims>(token, &DecodingKey::from_secret(key.material()), &validation)
        {
            Ok(data) => return Ok(data.claims),
            Err(e) => last_error = Some(e),
        }
    }
    Err(TokenError::InvalidToken(
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no verification keys available".to_string()),
    ))
}

/// Read claims without verifying the signature; for deriving the revocation
/// TTL only, never for authorization.
fn decode_unverified(token: &str) -> Option<TokenClaims> {
    let mut validation = hs256_validation();
    validation.insecure_disable_signature_validation();
    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockall::mock;
    use uuid::Uuid;

    use super::*;
    use crate::keys::LocalKeyProvider;
    use crate::store::CacheError;
    use crate::store::MemoryCacheStore;

    mock! {
        pub TestCacheStore {}

        #[async_trait]
        impl CacheStore for TestCacheStore {
            async fn set(&self, key: &str, value: &str, ttl: Option<StdDuration>) -> Result<(), CacheError>;
            async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
            async fn delete(&self, key: &str) -> Result<(), CacheError>;
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            role: "user".to_string(),
        }
    }

    fn service_with_provider(
        provider: Arc<LocalKeyProvider>,
    ) -> TokenService<LocalKeyProvider, MemoryCacheStore> {
        TokenService::new(
            TokenConfig::default(),
            provider,
            RevocationRegistry::new(Arc::new(MemoryCacheStore::new())),
        )
    }

    fn service() -> TokenService<LocalKeyProvider, MemoryCacheStore> {
        service_with_provider(Arc::new(LocalKeyProvider::new()))
    }

    #[tokio::test]
    async fn test_issue_validate_round_trip_for_every_kind() {
        let service = service();
        let identity = identity();

        for kind in TokenKind::ALL {
            let token = service.issue(&identity, kind).await.unwrap();
            let claims = service.validate(&token, kind).await.unwrap();

            assert_eq!(claims.sub, identity.user_id);
            assert_eq!(claims.email, identity.email);
            assert_eq!(claims.username, identity.username);
            assert_eq!(claims.role, identity.role);
            assert_eq!(claims.kind, kind);
        }
    }

    #[tokio::test]
    async fn test_kind_mismatch_is_invalid() {
        let service = service();

        let token = service
            .issue(&identity(), TokenKind::Refresh)
            .await
            .unwrap();
        let result = service.validate(&token, TokenKind::Access).await;
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_revoked_token_fails_before_expiry() {
        let service = service();

        let token = service.issue(&identity(), TokenKind::Access).await.unwrap();
        service.revoke(&token).await.unwrap();

        let result = service.validate(&token, TokenKind::Access).await;
        assert!(matches!(result, Err(TokenError::Revoked)));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let service = service();

        let token = service.issue(&identity(), TokenKind::Access).await.unwrap();
        service.revoke(&token).await.unwrap();
        service.revoke(&token).await.unwrap();

        let result = service.validate(&token, TokenKind::Access).await;
        assert!(matches!(result, Err(TokenError::Revoked)));
    }

    #[tokio::test]
    async fn test_revoke_accepts_unparseable_tokens() {
        // Fingerprints are content-addressed, so garbage can be marked too;
        // the TTL falls back to the access-token duration.
        let service = service();
        service.revoke("not-a-token").await.unwrap();
    }

    #[tokio::test]
    async fn test_tampered_token_is_invalid() {
        let service = service();

        let token = service.issue(&identity(), TokenKind::Access).await.unwrap();
        let mut tampered = token.clone();
        tampered.truncate(token.len() - 2);

        let result = service.validate(&tampered, TokenKind::Access).await;
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_access_token_expired_after_its_window() {
        // A 15-minute access token validated 16 minutes later: backdate the
        // claims and sign them with the service's own key.
        let provider = Arc::new(LocalKeyProvider::new());
        let service = service_with_provider(Arc::clone(&provider));

        let key = provider.signing_key(TokenKind::Access).await.unwrap();
        let claims = TokenClaims::stamp(
            &identity(),
            TokenKind::Access,
            Utc::now() - Duration::minutes(16),
            Duration::minutes(15),
        );
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.material()),
        )
        .unwrap();

        let result = service.validate(&token, TokenKind::Access).await;
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[tokio::test]
    async fn test_foreign_algorithm_is_rejected_outright() {
        let provider = Arc::new(LocalKeyProvider::new());
        let service = service_with_provider(Arc::clone(&provider));

        let key = provider.signing_key(TokenKind::Access).await.unwrap();
        let claims = TokenClaims::stamp(
            &identity(),
            TokenKind::Access,
            Utc::now(),
            Duration::minutes(15),
        );
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(key.material()),
        )
        .unwrap();

        let result = service.validate(&token, TokenKind::Access).await;
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_local_rotation_invalidates_outstanding_tokens() {
        // Documented behavior of the history-1 local tier: two sequential
        // rotations guarantee a token issued before the second one fails.
        let provider = Arc::new(LocalKeyProvider::new());
        let service = service_with_provider(Arc::clone(&provider));

        let token = service.issue(&identity(), TokenKind::Access).await.unwrap();
        provider.rotate(TokenKind::Access).await.unwrap();
        provider.rotate(TokenKind::Access).await.unwrap();

        let result = service.validate(&token, TokenKind::Access).await;
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_key_history_gives_one_rotation_of_grace() {
        let provider = Arc::new(LocalKeyProvider::with_history(2));
        let service = service_with_provider(Arc::clone(&provider));

        let token = service.issue(&identity(), TokenKind::Access).await.unwrap();

        provider.rotate(TokenKind::Access).await.unwrap();
        assert!(service.validate(&token, TokenKind::Access).await.is_ok());

        provider.rotate(TokenKind::Access).await.unwrap();
        let result = service.validate(&token, TokenKind::Access).await;
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_revocation_check_fails_closed() {
        let mut store = MockTestCacheStore::new();
        store
            .expect_get()
            .returning(|_| Err(CacheError::Unavailable("connection reset".to_string())));

        let service = TokenService::new(
            TokenConfig::default(),
            Arc::new(LocalKeyProvider::new()),
            RevocationRegistry::new(Arc::new(store)),
        );

        // Revocation is checked before anything else, so the failure surfaces
        // even before the token is parsed.
        let result = service.validate("aaa.bbb.ccc", TokenKind::Access).await;
        assert!(matches!(result, Err(TokenError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_revoke_surfaces_store_failures() {
        let mut store = MockTestCacheStore::new();
        store
            .expect_set()
            .returning(|_, _, _| Err(CacheError::Unavailable("connection reset".to_string())));

        let service = TokenService::new(
            TokenConfig::default(),
            Arc::new(LocalKeyProvider::new()),
            RevocationRegistry::new(Arc::new(store)),
        );

        let result = service.revoke("aaa.bbb.ccc").await;
        assert!(matches!(result, Err(TokenError::StoreUnavailable(_))));
    }
}
