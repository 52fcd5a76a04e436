//! PostgreSQL implementation of user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{NewUser, SessionState, User, UserSummary};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// PostgreSQL repository for user accounts.
///
/// Stores bcrypt password hashes and the HMAC digest of the current refresh
/// token. Raw tokens are never persisted.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    user_name: String,
    email: String,
    password_hash: String,
    refresh_token_hash: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            user_name: r.user_name,
            email: r.email,
            password_hash: r.password_hash,
            refresh_token_hash: r.refresh_token_hash,
            last_login_at: r.last_login_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserSummaryRow {
    id: i64,
    user_name: String,
    email: String,
    created_at: DateTime<Utc>,
    link_count: i64,
}

const USER_COLUMNS: &str = "id, user_name, email, password_hash, refresh_token_hash, \
                            last_login_at, created_at, updated_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (user_name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.user_name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(User::from))
    }

    async fn list(&self) -> Result<Vec<UserSummary>, AppError> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r#"
            SELECT
                u.id,
                u.user_name,
                u.email,
                u.created_at,
                COUNT(l.id) AS link_count
            FROM users u
            LEFT JOIN links l ON l.owner_id = u.id
            GROUP BY u.id
            ORDER BY u.created_at DESC, u.id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| UserSummary {
                id: r.id,
                user_name: r.user_name,
                email: r.email,
                created_at: r.created_at,
                link_count: r.link_count,
            })
            .collect())
    }

    async fn save_session(&self, session: &SessionState) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET refresh_token_hash = $2,
                last_login_at = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(session.user_id)
        .bind(&session.refresh_token_hash)
        .bind(session.last_login_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(User::from))
    }

    async fn rotate_session(
        &self,
        expected_hash: &str,
        session: &SessionState,
    ) -> Result<Option<User>, AppError> {
        // Compare-and-set: of two concurrent refreshes with the same token,
        // only the first UPDATE still sees the expected hash.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET refresh_token_hash = $2,
                last_login_at = $3,
                updated_at = NOW()
            WHERE id = $1
              AND refresh_token_hash = $4
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(session.user_id)
        .bind(&session.refresh_token_hash)
        .bind(session.last_login_at)
        .bind(expected_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(User::from))
    }
}
