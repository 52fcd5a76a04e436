//! In-memory store implementing both repository traits.
//!
//! Each operation runs under one lock, matching the single-statement
//! atomicity of the PostgreSQL repositories: unique ids, click appends and
//! the refresh-token compare-and-set all behave the same way.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Mutex;

use tinylink::domain::entities::{
    Click, LinkSummary, NewClick, NewShortLink, NewUser, OwnedLinkSummary, Resolution,
    SessionState, ShortLink, User, UserSummary,
};
use tinylink::domain::repositories::{LinkRepository, UserRepository};
use tinylink::error::AppError;

#[derive(Default)]
struct Data {
    links: Vec<ShortLink>,
    users: Vec<User>,
    fail_storage: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
}

fn unique_violation(constraint: &str) -> AppError {
    AppError::conflict(
        "Unique constraint violation",
        json!({ "constraint": constraint }),
    )
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call fail like an unreachable database.
    pub fn fail_storage(&self) {
        self.data.lock().unwrap().fail_storage = true;
    }

    pub fn click_count(&self, short_id: &str) -> usize {
        let data = self.data.lock().unwrap();
        data.links
            .iter()
            .find(|l| l.short_id == short_id)
            .map(|l| l.clicks.len())
            .unwrap_or(0)
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let data = self.data.lock().unwrap();
        data.users.iter().find(|u| u.email == email).cloned()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Data>, AppError> {
        let data = self.data.lock().unwrap();
        if data.fail_storage {
            return Err(AppError::internal(
                "Database error",
                json!({ "reason": "storage unavailable" }),
            ));
        }
        Ok(data)
    }
}

fn summary(link: &ShortLink) -> LinkSummary {
    LinkSummary {
        short_id: link.short_id.clone(),
        original_url: link.original_url.clone(),
        owner_id: link.owner_id,
        created_at: link.created_at,
        click_count: link.clicks.len() as i64,
    }
}

fn newest_first(links: &[ShortLink]) -> Vec<&ShortLink> {
    let mut sorted: Vec<&ShortLink> = links.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    sorted
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut data = self.lock()?;

        if data.links.iter().any(|l| l.short_id == new_link.short_id) {
            return Err(unique_violation("links_short_id_key"));
        }
        if let Some(custom) = &new_link.custom_short_id
            && data
                .links
                .iter()
                .any(|l| l.custom_short_id.as_ref() == Some(custom))
        {
            return Err(unique_violation("links_custom_short_id_key"));
        }

        let link = ShortLink::new(
            data.links.len() as i64 + 1,
            new_link.short_id,
            new_link.custom_short_id,
            new_link.original_url,
            new_link.owner_id,
            Utc::now(),
        );
        data.links.push(link.clone());

        Ok(link)
    }

    async fn find_by_custom_short_id(
        &self,
        custom_short_id: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let data = self.lock()?;
        Ok(data
            .links
            .iter()
            .find(|l| l.custom_short_id.as_deref() == Some(custom_short_id))
            .map(|l| l.clone().with_clicks(Vec::new())))
    }

    async fn find_owned(
        &self,
        short_id: &str,
        owner_id: i64,
    ) -> Result<Option<ShortLink>, AppError> {
        let data = self.lock()?;
        Ok(data
            .links
            .iter()
            .find(|l| l.short_id == short_id && l.owner_id == owner_id)
            .cloned())
    }

    async fn record_click(
        &self,
        short_id: &str,
        click: NewClick,
    ) -> Result<Option<Resolution>, AppError> {
        let mut data = self.lock()?;

        let Some(link) = data.links.iter_mut().find(|l| l.short_id == short_id) else {
            return Ok(None);
        };

        let clicked_at = Utc::now();
        link.clicks.push(Click::new(
            clicked_at,
            click.referrer,
            click.ip,
            click.user_agent,
        ));

        Ok(Some(Resolution {
            short_id: link.short_id.clone(),
            original_url: link.original_url.clone(),
            clicked_at,
        }))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<LinkSummary>, AppError> {
        let data = self.lock()?;
        Ok(newest_first(&data.links)
            .into_iter()
            .filter(|l| l.owner_id == owner_id)
            .map(summary)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<OwnedLinkSummary>, AppError> {
        let data = self.lock()?;
        Ok(newest_first(&data.links)
            .into_iter()
            .map(|l| {
                let owner = data.users.iter().find(|u| u.id == l.owner_id);
                OwnedLinkSummary {
                    summary: summary(l),
                    owner_name: owner.map(|u| u.user_name.clone()),
                    owner_email: owner.map(|u| u.email.clone()),
                }
            })
            .collect())
    }

    async fn list_all_with_clicks(&self) -> Result<Vec<ShortLink>, AppError> {
        let data = self.lock()?;
        Ok(newest_first(&data.links).into_iter().cloned().collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut data = self.lock()?;

        if data.users.iter().any(|u| u.email == new_user.email) {
            return Err(unique_violation("users_email_key"));
        }

        let now = Utc::now();
        let user = User {
            id: data.users.len() as i64 + 1,
            user_name: new_user.user_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            refresh_token_hash: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        data.users.push(user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let data = self.lock()?;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let data = self.lock()?;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<UserSummary>, AppError> {
        let data = self.lock()?;
        let mut users: Vec<UserSummary> = data
            .users
            .iter()
            .map(|u| UserSummary {
                id: u.id,
                user_name: u.user_name.clone(),
                email: u.email.clone(),
                created_at: u.created_at,
                link_count: data.links.iter().filter(|l| l.owner_id == u.id).count() as i64,
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn save_session(&self, session: &SessionState) -> Result<Option<User>, AppError> {
        let mut data = self.lock()?;
        let Some(user) = data.users.iter_mut().find(|u| u.id == session.user_id) else {
            return Ok(None);
        };

        user.refresh_token_hash = session.refresh_token_hash.clone();
        user.last_login_at = session.last_login_at;
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn rotate_session(
        &self,
        expected_hash: &str,
        session: &SessionState,
    ) -> Result<Option<User>, AppError> {
        let mut data = self.lock()?;
        let Some(user) = data.users.iter_mut().find(|u| {
            u.id == session.user_id && u.refresh_token_hash.as_deref() == Some(expected_hash)
        }) else {
            return Ok(None);
        };

        user.refresh_token_hash = session.refresh_token_hash.clone();
        user.last_login_at = session.last_login_at;
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }
}
