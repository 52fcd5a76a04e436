//! Repository trait for short link data access.

use crate::domain::entities::{
    LinkSummary, NewClick, NewShortLink, OwnedLinkSummary, Resolution, ShortLink,
};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short links and their clicks.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short id or custom short id is
    /// already taken. The violated constraint name is kept in the details.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its user-supplied custom id. Click history is not loaded.
    async fn find_by_custom_short_id(
        &self,
        custom_short_id: &str,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Finds a link owned by `owner_id`, with its full click history.
    ///
    /// Returns `Ok(None)` both when the link does not exist and when it
    /// belongs to someone else.
    async fn find_owned(
        &self,
        short_id: &str,
        owner_id: i64,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Looks the link up and appends a click in one atomic statement.
    ///
    /// Returns `Ok(None)` when no link has this short id; no click is stored
    /// in that case.
    async fn record_click(
        &self,
        short_id: &str,
        click: NewClick,
    ) -> Result<Option<Resolution>, AppError>;

    /// Links owned by `owner_id`, newest first, with click counts.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<LinkSummary>, AppError>;

    /// All links, newest first, with click counts and owner details.
    async fn list_all(&self) -> Result<Vec<OwnedLinkSummary>, AppError>;

    /// All links, newest first, each with its full click history.
    async fn list_all_with_clicks(&self) -> Result<Vec<ShortLink>, AppError>;

    /// Round-trips the store. Used by the health check.
    async fn ping(&self) -> Result<(), AppError>;
}
