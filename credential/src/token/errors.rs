use thiserror::Error;

/// Error type for token issuance, validation, and revocation.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    /// Malformed token, bad signature, unexpected signing algorithm, or a
    /// declared kind that does not match the requested one.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token is expired")]
    Expired,

    #[error("token has been revoked")]
    Revoked,

    /// The shared store could not answer a revocation check or key fetch and
    /// no fallback remained. Callers must treat this as "cannot authorize",
    /// never as "not revoked".
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(String),

    /// Signing or encoding failed at issuance; fatal, not retryable.
    #[error("failed to sign token: {0}")]
    SigningFailed(String),
}
