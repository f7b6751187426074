/// Password strength requirements.
///
/// Supplied at service construction; never persisted per user.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl PasswordPolicy {
    /// Number of enabled character classes.
    pub(crate) fn enabled_classes(&self) -> usize {
        [
            self.require_uppercase,
            self.require_lowercase,
            self.require_digit,
            self.require_special,
        ]
        .iter()
        .filter(|enabled| **enabled)
        .count()
    }
}

impl Default for PasswordPolicy {
    /// 8 to 128 characters with all four character classes required.
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

/// Argon2id cost parameters.
///
/// The PHC hash output embeds algorithm and cost, so raising costs later
/// never invalidates previously stored hashes.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    /// Argon2id defaults: 19 MiB, 2 iterations, 1 lane.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}
