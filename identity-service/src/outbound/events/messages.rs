use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Serializable envelope for credential lifecycle notifications.
///
/// Published after the credential operation completes; each payload carries
/// what downstream consumers (email delivery, audit) need without a user
/// store lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum CredentialEvent {
    UserRegistered {
        user_id: Uuid,
        email: String,
        occurred_at: DateTime<Utc>,
    },
    EmailVerified {
        user_id: Uuid,
        occurred_at: DateTime<Utc>,
    },
    PasswordResetRequested {
        user_id: Uuid,
        email: String,
        occurred_at: DateTime<Utc>,
    },
    PasswordChanged {
        user_id: Uuid,
        occurred_at: DateTime<Utc>,
    },
    LoggedOut {
        user_id: Uuid,
        occurred_at: DateTime<Utc>,
    },
}

impl CredentialEvent {
    /// Get the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            CredentialEvent::UserRegistered { .. } => "user_registered",
            CredentialEvent::EmailVerified { .. } => "email_verified",
            CredentialEvent::PasswordResetRequested { .. } => "password_reset_requested",
            CredentialEvent::PasswordChanged { .. } => "password_changed",
            CredentialEvent::LoggedOut { .. } => "logged_out",
        }
    }

    /// Extract the user this event relates to; used as the partition key so
    /// events for one user stay ordered.
    pub fn user_id(&self) -> Uuid {
        match self {
            CredentialEvent::UserRegistered { user_id, .. }
            | CredentialEvent::EmailVerified { user_id, .. }
            | CredentialEvent::PasswordResetRequested { user_id, .. }
            | CredentialEvent::PasswordChanged { user_id, .. }
            | CredentialEvent::LoggedOut { user_id, .. } => *user_id,
        }
    }
}
