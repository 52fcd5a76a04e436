//! User entity and session state transitions.

use chrono::{DateTime, Utc};
use std::fmt;

/// A registered account.
///
/// `password_hash` and `refresh_token_hash` never leave the server; the API
/// layer exposes users only through a public projection.
#[derive(Clone)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub refresh_token_hash: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .field(
                "refresh_token_hash",
                &self.refresh_token_hash.as_ref().map(|_| "[redacted]"),
            )
            .field("last_login_at", &self.last_login_at)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// Session fields after a successful login, registration or refresh.
    ///
    /// The refresh hash and login timestamp always change together.
    pub fn start_session(&self, refresh_token_hash: String, now: DateTime<Utc>) -> SessionState {
        SessionState {
            user_id: self.id,
            refresh_token_hash: Some(refresh_token_hash),
            last_login_at: Some(now),
        }
    }

    /// Session fields after logout: the refresh hash is gone, the last login
    /// is kept.
    pub fn end_session(&self) -> SessionState {
        SessionState {
            user_id: self.id,
            refresh_token_hash: None,
            last_login_at: self.last_login_at,
        }
    }

    pub fn has_session(&self) -> bool {
        self.refresh_token_hash.is_some()
    }
}

/// Input data for creating a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Session fields of a user, persisted in a single write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user_id: i64,
    pub refresh_token_hash: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// User listing row with the number of links they own.
#[derive(Debug, Clone)]
pub struct UserSummary {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub link_count: i64,
}

/// Canonical form of an email address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
