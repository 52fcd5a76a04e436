//! Short link creation, resolution and analytics.

use std::sync::Arc;

use crate::domain::analytics::{LinkAnalytics, summarize};
use crate::domain::entities::{LinkSummary, NewClick, NewShortLink, Resolution, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_short_id, validate_custom_short_id};
use crate::utils::url_validator::validate_original_url;
use serde_json::json;

/// Insert attempts for a generated id before giving up.
const MAX_GENERATE_ATTEMPTS: usize = 5;

pub const URL_NOT_FOUND: &str = "URL not found";
pub const CUSTOM_ID_TAKEN: &str = "Custom short ID already in use";

/// A link together with analytics computed from its click history.
#[derive(Debug, Clone)]
pub struct LinkReport {
    pub link: ShortLink,
    pub analytics: LinkAnalytics,
}

impl LinkReport {
    /// Moves the click history out of `link` into the analytics.
    pub fn from_link(mut link: ShortLink) -> Self {
        let clicks = std::mem::take(&mut link.clicks);
        Self {
            link,
            analytics: summarize(clicks),
        }
    }
}

/// Service for creating, resolving and reporting on short links.
///
/// Uniqueness of short ids is enforced by the store. The pre-check on custom
/// ids only produces a friendlier error in the common case.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<dyn LinkRepository>) -> Self {
        Self { link_repository }
    }

    /// Creates a short link owned by `owner_id`.
    ///
    /// `original_url` is stored exactly as submitted. An empty
    /// `custom_short_id` is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or custom id is invalid.
    /// Returns [`AppError::Conflict`] if the custom id is taken.
    /// Returns [`AppError::Internal`] if no free generated id was found.
    pub async fn create(
        &self,
        owner_id: i64,
        original_url: &str,
        custom_short_id: Option<&str>,
    ) -> Result<ShortLink, AppError> {
        validate_original_url(original_url)?;

        match custom_short_id.filter(|c| !c.is_empty()) {
            Some(custom) => self.create_custom(owner_id, original_url, custom).await,
            None => self.create_generated(owner_id, original_url).await,
        }
    }

    async fn create_custom(
        &self,
        owner_id: i64,
        original_url: &str,
        custom: &str,
    ) -> Result<ShortLink, AppError> {
        validate_custom_short_id(custom)?;

        if self
            .link_repository
            .find_by_custom_short_id(custom)
            .await?
            .is_some()
        {
            return Err(custom_id_taken(custom, None));
        }

        let new_link = NewShortLink::custom(custom.to_string(), original_url.to_string(), owner_id);

        match self.link_repository.create(new_link).await {
            Ok(link) => {
                tracing::info!(short_id = %link.short_id, owner_id, "Custom short link created");
                Ok(link)
            }
            // Lost a race with a concurrent insert, or collided with a generated id.
            Err(AppError::Conflict { details, .. }) => Err(custom_id_taken(custom, Some(details))),
            Err(e) => Err(e),
        }
    }

    async fn create_generated(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<ShortLink, AppError> {
        for attempt in 1..=MAX_GENERATE_ATTEMPTS {
            let short_id = generate_short_id()?;
            let new_link =
                NewShortLink::generated(short_id.clone(), original_url.to_string(), owner_id);

            match self.link_repository.create(new_link).await {
                Ok(link) => {
                    tracing::info!(short_id = %link.short_id, owner_id, "Short link created");
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => {
                    tracing::debug!(%short_id, attempt, "Generated short id collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique short ID",
            json!({ "attempts": MAX_GENERATE_ATTEMPTS }),
        ))
    }

    /// Resolves a short id and records the click.
    ///
    /// The click is committed before this returns, so a caller that responds
    /// afterwards never reports a visit that was not stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] "URL not found" if no link has this id.
    pub async fn resolve(&self, short_id: &str, click: NewClick) -> Result<Resolution, AppError> {
        self.link_repository
            .record_click(short_id, click)
            .await?
            .ok_or_else(|| url_not_found(short_id))
    }

    /// Analytics for a link owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] "URL not found" if the link does not
    /// exist or belongs to someone else.
    pub async fn get_analytics(
        &self,
        short_id: &str,
        owner_id: i64,
    ) -> Result<LinkReport, AppError> {
        let link = self
            .link_repository
            .find_owned(short_id, owner_id)
            .await?
            .ok_or_else(|| url_not_found(short_id))?;

        Ok(LinkReport::from_link(link))
    }

    /// The caller's links, newest first.
    pub async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<LinkSummary>, AppError> {
        self.link_repository.list_by_owner(owner_id).await
    }

    /// Checks that the link store is reachable.
    pub async fn health(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }
}

fn url_not_found(short_id: &str) -> AppError {
    AppError::not_found(URL_NOT_FOUND, json!({ "short_id": short_id }))
}

fn custom_id_taken(custom: &str, storage: Option<serde_json::Value>) -> AppError {
    AppError::conflict(
        CUSTOM_ID_TAKEN,
        json!({ "custom_short_id": custom, "storage": storage }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Click;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::{Duration, Utc};

    fn create_test_link(short_id: &str, url: &str, custom: bool) -> ShortLink {
        ShortLink::new(
            10,
            short_id.to_string(),
            custom.then(|| short_id.to_string()),
            url.to_string(),
            1,
            Utc::now(),
        )
    }

    fn conflict() -> AppError {
        AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": "links_short_id_key" }),
        )
    }

    #[tokio::test]
    async fn test_create_generated_link() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_create()
            .withf(|new_link| {
                new_link.short_id.len() == 8
                    && new_link.custom_short_id.is_none()
                    && new_link.original_url == "https://example.com/a?b=c"
                    && new_link.owner_id == 1
            })
            .times(1)
            .returning(|new_link| Ok(create_test_link(&new_link.short_id, &new_link.original_url, false)));

        let service = LinkService::new(Arc::new(mock_repo));

        let link = service
            .create(1, "https://example.com/a?b=c", None)
            .await
            .unwrap();

        assert_eq!(link.original_url, "https://example.com/a?b=c");
        assert_eq!(link.short_id.len(), 8);
    }

    #[tokio::test]
    async fn test_create_retries_on_generated_collision() {
        let mut mock_repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();

        mock_repo
            .expect_create()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(conflict()));
        mock_repo
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_link| Ok(create_test_link(&new_link.short_id, &new_link.original_url, false)));

        let service = LinkService::new(Arc::new(mock_repo));

        assert!(service.create(1, "https://example.com", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_gives_up_after_bounded_attempts() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_create()
            .times(MAX_GENERATE_ATTEMPTS)
            .returning(|_| Err(conflict()));

        let service = LinkService::new(Arc::new(mock_repo));

        let err = service
            .create(1, "https://example.com", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_custom_link() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_custom_short_id()
            .withf(|c| c == "my-link")
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_create()
            .withf(|new_link| {
                new_link.short_id == "my-link"
                    && new_link.custom_short_id.as_deref() == Some("my-link")
            })
            .times(1)
            .returning(|new_link| Ok(create_test_link(&new_link.short_id, &new_link.original_url, true)));

        let service = LinkService::new(Arc::new(mock_repo));

        let link = service
            .create(1, "https://example.com", Some("my-link"))
            .await
            .unwrap();

        assert_eq!(link.short_id, "my-link");
        assert!(link.is_custom());
    }

    #[tokio::test]
    async fn test_create_custom_link_taken() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_custom_short_id()
            .times(1)
            .returning(|_| Ok(Some(create_test_link("taken", "https://other.com", true))));
        mock_repo.expect_create().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        let err = service
            .create(1, "https://example.com", Some("taken"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), "Custom short ID already in use");
    }

    #[tokio::test]
    async fn test_create_custom_link_race_reported_as_taken() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_custom_short_id()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_create()
            .times(1)
            .returning(|_| Err(conflict()));

        let service = LinkService::new(Arc::new(mock_repo));

        let err = service
            .create(1, "https://example.com", Some("racy-id"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Custom short ID already in use");
    }

    #[tokio::test]
    async fn test_create_empty_custom_id_is_generated() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_find_by_custom_short_id().times(0);
        mock_repo
            .expect_create()
            .withf(|new_link| new_link.custom_short_id.is_none())
            .times(1)
            .returning(|new_link| Ok(create_test_link(&new_link.short_id, &new_link.original_url, false)));

        let service = LinkService::new(Arc::new(mock_repo));

        assert!(service.create(1, "https://example.com", Some("")).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_create().times(0);
        let service = LinkService::new(Arc::new(mock_repo));

        let err = service.create(1, "", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Original URL is required");

        let err = service.create(1, "not-a-url", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid URL format");

        let err = service
            .create(1, "https://example.com", Some("a b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_resolve_records_click() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_record_click()
            .withf(|short_id, click| {
                short_id == "abc12345" && click.referrer == "Direct" && click.ip == "1.2.3.4"
            })
            .times(1)
            .returning(|short_id, _| {
                Ok(Some(Resolution {
                    short_id: short_id.to_string(),
                    original_url: "https://example.com".to_string(),
                    clicked_at: Utc::now(),
                }))
            });

        let service = LinkService::new(Arc::new(mock_repo));

        let resolution = service
            .resolve("abc12345", NewClick::new(None, "1.2.3.4", None))
            .await
            .unwrap();

        assert_eq!(resolution.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_resolve_unknown_id() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_record_click()
            .times(1)
            .returning(|_, _| Ok(None));

        let service = LinkService::new(Arc::new(mock_repo));

        let err = service
            .resolve("missing", NewClick::new(None, "1.2.3.4", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "URL not found");
    }

    #[tokio::test]
    async fn test_get_analytics_for_owner() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_owned()
            .withf(|short_id, owner_id| short_id == "abc12345" && *owner_id == 1)
            .times(1)
            .returning(|_, _| {
                let now = Utc::now();
                Ok(Some(create_test_link("abc12345", "https://example.com", false).with_clicks(
                    vec![
                        Click::new(now, "Direct".to_string(), "1.1.1.1".to_string(), None),
                        Click::new(
                            now + Duration::seconds(1),
                            "https://t.co".to_string(),
                            "1.1.1.1".to_string(),
                            None,
                        ),
                    ],
                )))
            });

        let service = LinkService::new(Arc::new(mock_repo));

        let report = service.get_analytics("abc12345", 1).await.unwrap();

        assert_eq!(report.analytics.clicks, 2);
        assert_eq!(report.analytics.unique_clicks, 1);
        assert_eq!(report.analytics.referrers, vec!["Direct", "https://t.co"]);
        assert!(report.link.clicks.is_empty());
    }

    #[tokio::test]
    async fn test_get_analytics_not_owner() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_owned()
            .times(1)
            .returning(|_, _| Ok(None));

        let service = LinkService::new(Arc::new(mock_repo));

        let err = service.get_analytics("abc12345", 2).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "URL not found");
    }
}
