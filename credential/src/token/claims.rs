use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Category of an issued token.
///
/// Each kind has its own validity duration and signing-key namespace; a token
/// only validates against the kind it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Reset,
    Verification,
}

impl TokenKind {
    /// All token kinds, in a stable order.
    pub const ALL: [TokenKind; 4] = [
        TokenKind::Access,
        TokenKind::Refresh,
        TokenKind::Reset,
        TokenKind::Verification,
    ];

    /// Lowercase name used in wire payloads and store key namespaces.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::Reset => "reset",
            TokenKind::Verification => "verification",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity facts a caller supplies at token issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub role: String,
}

/// Claims embedded in every signed token.
///
/// Immutable once constructed; carried as the JWT payload and never persisted
/// on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject user identifier.
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    pub role: String,
    /// Kind the token was issued for.
    pub kind: TokenKind,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl TokenClaims {
    /// Stamp claims for `identity`, valid for `validity` from `issued_at`.
    pub fn stamp(
        identity: &Identity,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        Self {
            sub: identity.user_id,
            email: identity.email.clone(),
            username: identity.username.clone(),
            role: identity.role.clone(),
            kind,
            iat: issued_at.timestamp(),
            exp: (issued_at + validity).timestamp(),
        }
    }

    /// Check if the token was expired at `now` (Unix timestamp).
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp < now
    }

    /// Seconds of validity left at `now`; zero once expired.
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        (self.exp - now).max(0)
    }
}
