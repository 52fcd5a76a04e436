//! Operator views over all users and links.

use std::sync::Arc;

use serde_json::json;

use crate::application::services::link_service::LinkReport;
use crate::domain::entities::{OwnedLinkSummary, UserSummary, normalize_email};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;

const ADMIN_REQUIRED: &str = "Admin access required";

/// Service behind the `/api/v1/admin` routes.
///
/// The operator is identified by email. Without a configured admin email
/// every caller is rejected.
pub struct AdminService {
    link_repository: Arc<dyn LinkRepository>,
    user_repository: Arc<dyn UserRepository>,
    admin_email: Option<String>,
}

impl AdminService {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        user_repository: Arc<dyn UserRepository>,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            link_repository,
            user_repository,
            admin_email: admin_email.map(|e| normalize_email(&e)),
        }
    }

    /// Checks that `user_id` belongs to the operator account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] "Admin access required".
    pub async fn ensure_admin(&self, user_id: i64) -> Result<(), AppError> {
        let Some(admin_email) = self.admin_email.as_deref() else {
            return Err(AppError::unauthorized(
                ADMIN_REQUIRED,
                json!({ "reason": "admin email not configured" }),
            ));
        };

        let user = self.user_repository.find_by_id(user_id).await?;

        match user {
            Some(user) if user.email == admin_email => Ok(()),
            _ => {
                tracing::warn!(user_id, "Admin route rejected");
                Err(AppError::unauthorized(
                    ADMIN_REQUIRED,
                    json!({ "user_id": user_id }),
                ))
            }
        }
    }

    /// Every link with its click count and owner.
    pub async fn list_links(&self) -> Result<Vec<OwnedLinkSummary>, AppError> {
        self.link_repository.list_all().await
    }

    /// Every user with the number of links they own.
    pub async fn list_users(&self) -> Result<Vec<UserSummary>, AppError> {
        self.user_repository.list().await
    }

    /// Analytics for every link, newest first.
    pub async fn analytics_overview(&self) -> Result<Vec<LinkReport>, AppError> {
        let links = self.link_repository.list_all_with_clicks().await?;
        Ok(links.into_iter().map(LinkReport::from_link).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Click, ShortLink, User};
    use crate::domain::repositories::{MockLinkRepository, MockUserRepository};
    use chrono::Utc;

    fn user_with_email(id: i64, email: &str) -> User {
        let now = Utc::now();
        User {
            id,
            user_name: "operator".to_string(),
            email: email.to_string(),
            password_hash: "x".to_string(),
            refresh_token_hash: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_ensure_admin_accepts_configured_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(user_with_email(id, "admin@example.com"))));

        let service = AdminService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(users),
            Some("Admin@Example.com".to_string()),
        );

        assert!(service.ensure_admin(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_ensure_admin_rejects_other_users() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(user_with_email(id, "someone@example.com"))));

        let service = AdminService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(users),
            Some("admin@example.com".to_string()),
        );

        let err = service.ensure_admin(2).await.unwrap_err();
        assert_eq!(err.to_string(), "Admin access required");
    }

    #[tokio::test]
    async fn test_ensure_admin_without_configuration() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(0);

        let service = AdminService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(users),
            None,
        );

        assert!(matches!(
            service.ensure_admin(1).await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_analytics_overview() {
        let mut links = MockLinkRepository::new();
        links.expect_list_all_with_clicks().times(1).returning(|| {
            let link = ShortLink::new(
                1,
                "abc12345".to_string(),
                None,
                "https://example.com".to_string(),
                1,
                Utc::now(),
            )
            .with_clicks(vec![
                Click::new(Utc::now(), "Direct".to_string(), "1.1.1.1".to_string(), None),
                Click::new(Utc::now(), "Direct".to_string(), "2.2.2.2".to_string(), None),
            ]);
            Ok(vec![link])
        });

        let service = AdminService::new(
            Arc::new(links),
            Arc::new(MockUserRepository::new()),
            None,
        );

        let reports = service.analytics_overview().await.unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].analytics.clicks, 2);
        assert_eq!(reports[0].analytics.unique_clicks, 2);
        assert_eq!(reports[0].analytics.referrers, vec!["Direct"]);
    }
}
