use std::env;
use std::time::Duration;

use chrono::Duration as TokenDuration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use credential::password::HashingConfig;
use credential::password::PasswordPolicy;
use credential::token::TokenConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub tokens: TokensConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Upper bound for a single store round trip, in milliseconds. A timed
    /// out call counts as store-unavailable, never as "not found".
    pub operation_timeout_ms: u64,
}

impl RedisConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokensConfig {
    pub access_minutes: i64,
    pub refresh_minutes: i64,
    pub reset_minutes: i64,
    pub verification_minutes: i64,
    /// Signing keys retained per kind on the local fallback tier; 2 keeps
    /// tokens signed just before a rotation verifiable until the next one.
    pub key_history: usize,
}

impl TokensConfig {
    pub fn durations(&self) -> TokenConfig {
        TokenConfig {
            access: TokenDuration::minutes(self.access_minutes),
            refresh: TokenDuration::minutes(self.refresh_minutes),
            reset: TokenDuration::minutes(self.reset_minutes),
            verification: TokenDuration::minutes(self.verification_minutes),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl PasswordConfig {
    pub fn policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            min_length: self.min_length,
            max_length: self.max_length,
            require_uppercase: self.require_uppercase,
            require_lowercase: self.require_lowercase,
            require_digit: self.require_digit,
            require_special: self.require_special,
        }
    }

    pub fn hashing(&self) -> HashingConfig {
        HashingConfig {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (REDIS__URL, TOKENS__ACCESS_MINUTES, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: REDIS__URL=redis://... overrides redis.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_durations_conversion() {
        let tokens = TokensConfig {
            access_minutes: 15,
            refresh_minutes: 7 * 24 * 60,
            reset_minutes: 24 * 60,
            verification_minutes: 72 * 60,
            key_history: 2,
        };

        let durations = tokens.durations();
        assert_eq!(durations.access.num_minutes(), 15);
        assert_eq!(durations.refresh.num_days(), 7);
        assert_eq!(durations.reset.num_hours(), 24);
        assert_eq!(durations.verification.num_hours(), 72);
    }

    #[test]
    fn test_password_policy_conversion() {
        let password = PasswordConfig {
            min_length: 10,
            max_length: 64,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: false,
            require_special: false,
            argon2_memory_kib: 8 * 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        };

        let policy = password.policy();
        assert_eq!(policy.min_length, 10);
        assert_eq!(policy.max_length, 64);
        assert!(!policy.require_digit);

        let hashing = password.hashing();
        assert_eq!(hashing.memory_kib, 8 * 1024);
    }
}
