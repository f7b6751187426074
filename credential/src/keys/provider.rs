use std::fmt;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroize;

use crate::token::TokenKind;

/// Length of generated signing-key material in bytes (256 bits).
pub const KEY_LENGTH: usize = 32;

/// Error type for signing-key provider operations.
#[derive(Debug, Clone, Error)]
pub enum KeyProviderError {
    /// The tier cannot serve the request right now; a chain moves on to the
    /// next tier instead of surfacing this.
    #[error("key provider unavailable: {0}")]
    Unavailable(String),

    /// The shared store returned key material that could not be decoded.
    #[error("invalid {kind} key material: {reason}")]
    InvalidKeyMaterial { kind: TokenKind, reason: String },

    /// The operating-system entropy source failed; fatal, not retryable.
    #[error("key generation failed: {0}")]
    GenerationFailed(String),
}

/// Symmetric signing key owned by a provider for one token kind.
///
/// Material is zeroized on drop and leaves the provider boundary only
/// base64-encoded, for transport to the shared store.
#[derive(Clone)]
pub struct SigningKey {
    kind: TokenKind,
    material: Vec<u8>,
}

impl SigningKey {
    /// Generate a fresh 256-bit key for `kind` from OS entropy.
    ///
    /// # Errors
    /// * `GenerationFailed` - The entropy source failed
    pub fn generate(kind: TokenKind) -> Result<Self, KeyProviderError> {
        let mut material = vec![0u8; KEY_LENGTH];
        OsRng
            .try_fill_bytes(&mut material)
            .map_err(|e| KeyProviderError::GenerationFailed(e.to_string()))?;
        Ok(Self { kind, material })
    }

    /// Rebuild a key from its base64 store encoding.
    ///
    /// # Errors
    /// * `InvalidKeyMaterial` - Not valid base64, or shorter than 256 bits
    pub fn from_encoded(kind: TokenKind, encoded: &str) -> Result<Self, KeyProviderError> {
        let material =
            STANDARD
                .decode(encoded)
                .map_err(|e| KeyProviderError::InvalidKeyMaterial {
                    kind,
                    reason: e.to_string(),
                })?;
        if material.len() < KEY_LENGTH {
            return Err(KeyProviderError::InvalidKeyMaterial {
                kind,
                reason: format!("{} bytes, expected at least {}", material.len(), KEY_LENGTH),
            });
        }
        Ok(Self { kind, material })
    }

    /// Base64 encoding for transport to the shared store.
    pub fn encoded(&self) -> String {
        STANDARD.encode(&self.material)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Raw key material for the signing primitive.
    pub fn material(&self) -> &[u8] {
        &self.material
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kind", &self.kind)
            .field("material", &"<redacted>")
            .finish()
    }
}

/// Supplies signing material per token kind.
///
/// Per kind, a provider is either unprovisioned or provisioned; the first
/// `signing_key` call provisions lazily, it is not an error path. A tier that
/// cannot serve returns `Unavailable`; any other error is terminal.
#[async_trait]
pub trait KeyProvider: Send + Sync + 'static {
    /// Current signing key for `kind`, provisioning one if none exists yet.
    ///
    /// # Errors
    /// * `Unavailable` - This tier cannot serve the kind right now
    /// * `GenerationFailed` - Entropy source failed while provisioning
    async fn signing_key(&self, kind: TokenKind) -> Result<SigningKey, KeyProviderError>;

    /// Every key that may still verify tokens of `kind`, current first.
    ///
    /// # Errors
    /// * `Unavailable` - This tier cannot serve the kind right now
    async fn verification_keys(&self, kind: TokenKind) -> Result<Vec<SigningKey>, KeyProviderError>;

    /// Replace the signing key for `kind` with fresh material.
    ///
    /// # Errors
    /// * `Unavailable` - This tier cannot persist the new key
    /// * `GenerationFailed` - Entropy source failed
    async fn rotate(&self, kind: TokenKind) -> Result<(), KeyProviderError>;
}
