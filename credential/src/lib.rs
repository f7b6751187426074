//! Credential lifecycle library
//!
//! Provides the credential infrastructure for identity services:
//! - Password policy enforcement, hashing (Argon2id), and random generation
//! - Signed bearer tokens (JWT/HS256) for access, refresh, password-reset,
//!   and email-verification flows
//! - Two-tier signing-key management with rotation
//! - A TTL-bounded revocation registry backed by a shared key/value store
//!
//! The crate is self-contained: it performs no logging and owns no network
//! connections. External state goes through the [`store::CacheStore`] port,
//! which service crates implement against their shared store of choice.
//!
//! # Examples
//!
//! ## Password policy
//! ```
//! use credential::password::HashingConfig;
//! use credential::password::PasswordPolicy;
//! use credential::password::PasswordService;
//!
//! let passwords = PasswordService::new(PasswordPolicy::default(), HashingConfig::default()).unwrap();
//! let generated = passwords.generate().unwrap();
//! let hash = passwords.hash(&generated).unwrap();
//! assert!(passwords.verify(&generated, &hash).is_ok());
//! ```
//!
//! ## Token lifecycle
//! ```no_run
//! use std::sync::Arc;
//!
//! use credential::keys::LocalKeyProvider;
//! use credential::store::MemoryCacheStore;
//! use credential::token::Identity;
//! use credential::token::RevocationRegistry;
//! use credential::token::TokenConfig;
//! use credential::token::TokenKind;
//! use credential::token::TokenService;
//!
//! #[tokio::main]
//! async fn main() {
//!     let keys = Arc::new(LocalKeyProvider::new());
//!     let revocations = RevocationRegistry::new(Arc::new(MemoryCacheStore::new()));
//!     let tokens = TokenService::new(TokenConfig::default(), keys, revocations);
//!
//!     let identity = Identity {
//!         user_id: uuid::Uuid::new_v4(),
//!         email: "alice@example.com".to_string(),
//!         username: "alice".to_string(),
//!         role: "user".to_string(),
//!     };
//!
//!     let token = tokens.issue(&identity, TokenKind::Access).await.unwrap();
//!     let claims = tokens.validate(&token, TokenKind::Access).await.unwrap();
//!     assert_eq!(claims.username, "alice");
//!
//!     tokens.revoke(&token).await.unwrap();
//!     assert!(tokens.validate(&token, TokenKind::Access).await.is_err());
//! }
//! ```

pub mod keys;
pub mod password;
pub mod store;
pub mod token;

// Re-export commonly used items
pub use keys::KeyProvider;
pub use keys::KeyProviderChain;
pub use keys::KeyProviderError;
pub use keys::LocalKeyProvider;
pub use keys::SigningKey;
pub use keys::StoreKeyProvider;
pub use password::PasswordError;
pub use password::PasswordPolicy;
pub use password::PasswordService;
pub use store::CacheError;
pub use store::CacheStore;
pub use store::MemoryCacheStore;
pub use token::Identity;
pub use token::RevocationRegistry;
pub use token::TokenClaims;
pub use token::TokenConfig;
pub use token::TokenError;
pub use token::TokenKind;
pub use token::TokenService;
