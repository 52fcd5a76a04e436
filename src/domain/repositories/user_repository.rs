//! Repository trait for user accounts and their sessions.

use crate::domain::entities::{NewUser, SessionState, User, UserSummary};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for users.
///
/// Session fields (`refresh_token_hash`, `last_login_at`) are only written
/// through [`SessionState`], so they always change in a single statement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Looks a user up by an already normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// All users, newest first, with the number of links each owns.
    async fn list(&self) -> Result<Vec<UserSummary>, AppError>;

    /// Unconditionally writes the session fields.
    ///
    /// Returns the updated user, or `Ok(None)` if the user no longer exists.
    async fn save_session(&self, session: &SessionState) -> Result<Option<User>, AppError>;

    /// Writes the session fields only if the stored refresh hash still equals
    /// `expected_hash`.
    ///
    /// Returns `Ok(None)` when the comparison fails: the presented refresh
    /// token was already rotated, revoked or never issued.
    async fn rotate_session(
        &self,
        expected_hash: &str,
        session: &SessionState,
    ) -> Result<Option<User>, AppError>;
}
