use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    /// The password violates the configured policy.
    #[error("weak password: {reason}")]
    WeakPassword { reason: String },

    /// The hashing primitive itself failed; fatal, not retryable.
    #[error("password hashing failed: {0}")]
    HashingFailed(String),

    /// The password does not match the stored hash.
    ///
    /// Carries no detail on purpose: callers must not learn whether the
    /// mismatch came from content, length, or an undecodable hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The secure random source failed during generation.
    #[error("entropy source failed: {0}")]
    EntropyFailure(String),
}
