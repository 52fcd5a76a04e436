//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{
    Click, LinkSummary, NewClick, NewShortLink, OwnedLinkSummary, Resolution, ShortLink,
};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for links and their click history.
///
/// Click rows are ordered by their serial id, which is insertion order.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn clicks_for(&self, link_id: i64) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT link_id, clicked_at, referrer, ip, user_agent
            FROM link_clicks
            WHERE link_id = $1
            ORDER BY id
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }
}

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    short_id: String,
    custom_short_id: Option<String>,
    original_url: String,
    owner_id: i64,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for ShortLink {
    fn from(r: LinkRow) -> Self {
        ShortLink::new(
            r.id,
            r.short_id,
            r.custom_short_id,
            r.original_url,
            r.owner_id,
            r.created_at,
        )
    }
}

#[derive(FromRow)]
struct ClickRow {
    link_id: i64,
    clicked_at: DateTime<Utc>,
    referrer: String,
    ip: String,
    user_agent: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click::new(r.clicked_at, r.referrer, r.ip, r.user_agent)
    }
}

#[derive(FromRow)]
struct SummaryRow {
    short_id: String,
    original_url: String,
    owner_id: i64,
    created_at: DateTime<Utc>,
    click_count: i64,
    owner_name: Option<String>,
    owner_email: Option<String>,
}

impl SummaryRow {
    fn into_summary(self) -> LinkSummary {
        LinkSummary {
            short_id: self.short_id,
            original_url: self.original_url,
            owner_id: self.owner_id,
            created_at: self.created_at,
            click_count: self.click_count,
        }
    }
}

#[derive(FromRow)]
struct ResolutionRow {
    short_id: String,
    original_url: String,
    clicked_at: DateTime<Utc>,
}

const LINK_COLUMNS: &str = "id, short_id, custom_short_id, original_url, owner_id, created_at";

const SUMMARY_QUERY: &str = r#"
    SELECT
        l.short_id,
        l.original_url,
        l.owner_id,
        l.created_at,
        COUNT(c.id) AS click_count,
        u.user_name AS owner_name,
        u.email AS owner_email
    FROM links l
    LEFT JOIN link_clicks c ON c.link_id = l.id
    LEFT JOIN users u ON u.id = l.owner_id
    WHERE ($1::bigint IS NULL OR l.owner_id = $1)
    GROUP BY l.id, u.user_name, u.email
    ORDER BY l.created_at DESC, l.id DESC
"#;

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            INSERT INTO links (short_id, custom_short_id, original_url, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(&new_link.short_id)
        .bind(&new_link.custom_short_id)
        .bind(&new_link.original_url)
        .bind(new_link.owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_custom_short_id(
        &self,
        custom_short_id: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE custom_short_id = $1"
        ))
        .bind(custom_short_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn find_owned(
        &self,
        short_id: &str,
        owner_id: i64,
    ) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_id = $1 AND owner_id = $2"
        ))
        .bind(short_id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let clicks = self.clicks_for(row.id).await?;

        Ok(Some(ShortLink::from(row).with_clicks(clicks)))
    }

    async fn record_click(
        &self,
        short_id: &str,
        click: NewClick,
    ) -> Result<Option<Resolution>, AppError> {
        // Lookup and append in one statement: no window for a concurrent
        // writer between reading the link and storing the click.
        let row = sqlx::query_as::<_, ResolutionRow>(
            r#"
            WITH target AS (
                SELECT id, short_id, original_url
                FROM links
                WHERE short_id = $1
            ),
            inserted AS (
                INSERT INTO link_clicks (link_id, referrer, ip, user_agent)
                SELECT id, $2, $3, $4 FROM target
                RETURNING link_id, clicked_at
            )
            SELECT t.short_id, t.original_url, i.clicked_at
            FROM target t
            JOIN inserted i ON i.link_id = t.id
            "#,
        )
        .bind(short_id)
        .bind(&click.referrer)
        .bind(&click.ip)
        .bind(&click.user_agent)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| Resolution {
            short_id: r.short_id,
            original_url: r.original_url,
            clicked_at: r.clicked_at,
        }))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<LinkSummary>, AppError> {
        let rows = sqlx::query_as::<_, SummaryRow>(SUMMARY_QUERY)
            .bind(Some(owner_id))
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(SummaryRow::into_summary).collect())
    }

    async fn list_all(&self) -> Result<Vec<OwnedLinkSummary>, AppError> {
        let rows = sqlx::query_as::<_, SummaryRow>(SUMMARY_QUERY)
            .bind(None::<i64>)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|mut r| {
                let owner_name = r.owner_name.take();
                let owner_email = r.owner_email.take();
                OwnedLinkSummary {
                    summary: r.into_summary(),
                    owner_name,
                    owner_email,
                }
            })
            .collect())
    }

    async fn list_all_with_clicks(&self) -> Result<Vec<ShortLink>, AppError> {
        let links = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        let clicks = sqlx::query_as::<_, ClickRow>(
            "SELECT link_id, clicked_at, referrer, ip, user_agent FROM link_clicks ORDER BY id",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut by_link: HashMap<i64, Vec<Click>> = HashMap::new();
        for row in clicks {
            by_link.entry(row.link_id).or_default().push(row.into());
        }

        Ok(links
            .into_iter()
            .map(|row| {
                let clicks = by_link.remove(&row.id).unwrap_or_default();
                ShortLink::from(row).with_clicks(clicks)
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
