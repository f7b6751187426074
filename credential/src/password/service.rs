use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::entropy::EntropySource;
use super::entropy::OsEntropy;
use super::errors::PasswordError;
use super::policy::HashingConfig;
use super::policy::PasswordPolicy;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SPECIALS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Extra characters past the policy minimum in generated passwords.
const GENERATION_MARGIN: usize = 4;

/// Attempts before giving up when generated output keeps tripping the
/// weak-pattern deny-list.
const GENERATION_ATTEMPTS: usize = 16;

/// Sequences rejected anywhere in a password, matched case-insensitively.
const DENIED_SEQUENCES: &[&str] = &["password", "admin", "qwerty", "asdf"];

/// Password policy engine: strength validation, Argon2id hashing and
/// verification, and policy-compliant random generation.
pub struct PasswordService {
    policy: PasswordPolicy,
    hasher: Argon2<'static>,
    entropy: Box<dyn EntropySource>,
}

impl PasswordService {
    /// Create an engine with OS entropy.
    ///
    /// # Errors
    /// * `HashingFailed` - The cost parameters are out of range
    pub fn new(policy: PasswordPolicy, hashing: HashingConfig) -> Result<Self, PasswordError> {
        Self::with_entropy(policy, hashing, Box::new(OsEntropy))
    }

    /// Create an engine with an injected entropy source (tests).
    pub fn with_entropy(
        policy: PasswordPolicy,
        hashing: HashingConfig,
        entropy: Box<dyn EntropySource>,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(
            hashing.memory_kib,
            hashing.iterations,
            hashing.parallelism,
            None,
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(Self {
            policy,
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            entropy,
        })
    }

    /// Validate password strength against the configured policy.
    ///
    /// # Errors
    /// * `WeakPassword` - Length out of bounds, a required character class is
    ///   missing, or the password matches the deny-list
    pub fn validate(&self, password: &str) -> Result<(), PasswordError> {
        let length = password.chars().count();
        if length < self.policy.min_length {
            return Err(weak(format!(
                "must be at least {} characters long",
                self.policy.min_length
            )));
        }
        if length > self.policy.max_length {
            return Err(weak(format!(
                "must not exceed {} characters",
                self.policy.max_length
            )));
        }

        let mut has_upper = false;
        let mut has_lower = false;
        let mut has_digit = false;
        let mut has_special = false;
        for c in password.chars() {
            if c.is_uppercase() {
                has_upper = true;
            } else if c.is_lowercase() {
                has_lower = true;
            } else if c.is_numeric() {
                has_digit = true;
            } else if !c.is_whitespace() {
                has_special = true;
            }
        }

        if self.policy.require_uppercase && !has_upper {
            return Err(weak("must contain at least one uppercase letter"));
        }
        if self.policy.require_lowercase && !has_lower {
            return Err(weak("must contain at least one lowercase letter"));
        }
        if self.policy.require_digit && !has_digit {
            return Err(weak("must contain at least one digit"));
        }
        if self.policy.require_special && !has_special {
            return Err(weak("must contain at least one special character"));
        }

        check_deny_list(password)
    }

    /// Hash a password for storage.
    ///
    /// Validates first, then applies Argon2id with a random salt. The PHC
    /// output embeds algorithm and cost parameters.
    ///
    /// # Errors
    /// * `WeakPassword` - The password fails [`Self::validate`]
    /// * `HashingFailed` - The hashing primitive failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        self.validate(password)?;

        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored PHC hash.
    ///
    /// The comparison runs the full hash regardless of where a mismatch
    /// occurs, and every failure collapses into `InvalidCredentials`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Mismatch, or the stored hash is undecodable
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidCredentials)?;
        self.hasher
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| PasswordError::InvalidCredentials)
    }

    /// Generate a random password satisfying every enabled policy class.
    ///
    /// One mandatory character per enabled class is placed first, the rest is
    /// drawn from the union of enabled classes, and a Fisher-Yates pass fed
    /// by the same secure stream removes any positional bias. Output that
    /// happens to trip the deny-list is discarded and regenerated.
    ///
    /// # Errors
    /// * `EntropyFailure` - The secure random source failed
    pub fn generate(&self) -> Result<String, PasswordError> {
        for _ in 0..GENERATION_ATTEMPTS {
            let candidate = self.generate_candidate()?;
            if self.validate(&candidate).is_ok() {
                return Ok(candidate);
            }
        }
        Err(PasswordError::EntropyFailure(
            "could not produce a policy-compliant password".to_string(),
        ))
    }

    fn generate_candidate(&self) -> Result<String, PasswordError> {
        let mut mandatory: Vec<Vec<char>> = Vec::new();
        if self.policy.require_uppercase {
            mandatory.push(UPPERCASE.chars().collect());
        }
        if self.policy.require_lowercase {
            mandatory.push(LOWERCASE.chars().collect());
        }
        if self.policy.require_digit {
            mandatory.push(DIGITS.chars().collect());
        }
        if self.policy.require_special {
            mandatory.push(SPECIALS.chars().collect());
        }

        // Union of the enabled classes; with nothing enabled, draw from all.
        let alphabet: Vec<char> = if mandatory.is_empty() {
            [UPPERCASE, LOWERCASE, DIGITS, SPECIALS].concat().chars().collect()
        } else {
            mandatory.iter().flatten().copied().collect()
        };

        let length = self.policy.min_length.max(self.policy.enabled_classes()) + GENERATION_MARGIN;

        // One byte per pick, then a second run of bytes for the shuffle.
        let mut bytes = vec![0u8; length * 2];
        self.entropy.fill(&mut bytes)?;
        let (picks, swaps) = bytes.split_at(length);

        let mut chars: Vec<char> = Vec::with_capacity(length);
        for (i, class) in mandatory.iter().enumerate() {
            chars.push(class[picks[i] as usize % class.len()]);
        }
        for i in chars.len()..length {
            chars.push(alphabet[picks[i] as usize % alphabet.len()]);
        }

        // Fisher-Yates: the mandatory prefix must not stay at the front.
        for i in (1..chars.len()).rev() {
            let j = swaps[i] as usize % (i + 1);
            chars.swap(i, j);
        }

        Ok(chars.into_iter().collect())
    }
}

fn weak(reason: impl Into<String>) -> PasswordError {
    PasswordError::WeakPassword {
        reason: reason.into(),
    }
}

fn check_deny_list(password: &str) -> Result<(), PasswordError> {
    let lowered = password.to_lowercase();
    for sequence in DENIED_SEQUENCES {
        if lowered.contains(sequence) {
            return Err(weak(format!("contains the unsafe sequence \"{}\"", sequence)));
        }
    }
    if has_digit_run(password, 4) {
        return Err(weak("contains four or more consecutive digits"));
    }
    if has_repeat_run(password, 3) {
        return Err(weak("repeats the same character three or more times"));
    }
    Ok(())
}

fn has_digit_run(password: &str, limit: usize) -> bool {
    let mut run = 0;
    for c in password.chars() {
        if c.is_ascii_digit() {
            run += 1;
            if run >= limit {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

fn has_repeat_run(password: &str, limit: usize) -> bool {
    let mut run = 0;
    let mut previous = None;
    for c in password.chars() {
        if previous == Some(c) {
            run += 1;
        } else {
            run = 1;
            previous = Some(c);
        }
        if run >= limit {
            return true;
        }
    }
    false
}
