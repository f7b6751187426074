use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::PasswordError;

/// Source of cryptographically secure random bytes.
///
/// Seam for password generation so tests can substitute a deterministic
/// stream.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` with random bytes.
    ///
    /// # Errors
    /// * `EntropyFailure` - The underlying source failed
    fn fill(&self, dest: &mut [u8]) -> Result<(), PasswordError>;
}

/// Operating-system entropy source.
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), PasswordError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| PasswordError::EntropyFailure(e.to_string()))
    }
}
