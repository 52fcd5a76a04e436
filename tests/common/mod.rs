#![allow(dead_code)]

pub mod memory;

use axum_test::{TestResponse, TestServer};
use cookie::Cookie;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tinylink::config::Config;
use tinylink::routes::router;
use tinylink::state::AppState;

use memory::MemoryStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const FRONTEND_URL: &str = "https://tiny.example";
pub const PASSWORD: &str = "secret123";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/tinylink_test".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        jwt_secret: "test-access-secret".to_string(),
        jwt_refresh_secret: Some("test-refresh-secret".to_string()),
        access_token_minutes: 15,
        refresh_token_days: 7,
        // Lowest cost bcrypt accepts; keeps the suite fast.
        bcrypt_cost: 4,
        app_env: "test".to_string(),
        cookie_secure: false,
        admin_email: Some(ADMIN_EMAIL.to_string()),
        frontend_url: Some(FRONTEND_URL.to_string()),
        cors_origins: vec!["http://localhost:5173".to_string()],
        db_max_connections: 5,
        db_connect_timeout: 5,
        db_idle_timeout: 60,
        db_max_lifetime: 300,
    }
}

pub fn create_test_state(config: &Config) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(config, store.clone(), store.clone());
    (state, store)
}

/// Full router over an in-memory store.
pub fn create_test_server() -> (TestServer, Arc<MemoryStore>) {
    create_test_server_with(&test_config())
}

pub fn create_test_server_with(config: &Config) -> (TestServer, Arc<MemoryStore>) {
    let (state, store) = create_test_state(config);
    let app = router(state, &config.cors_origins);
    (TestServer::new(app).unwrap(), store)
}

/// Session cookies returned by register, login or refresh.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    pub fn access_cookie(&self) -> String {
        format!("accessToken={}", self.access_token)
    }

    pub fn refresh_cookie(&self) -> String {
        format!("refreshToken={}", self.refresh_token)
    }
}

/// `Set-Cookie` headers of a response, parsed.
pub fn set_cookies(response: &TestResponse) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v.to_string()).ok())
        .collect()
}

pub fn session_from(response: &TestResponse) -> Session {
    let cookies = set_cookies(response);
    let value = |name: &str| {
        cookies
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.value().to_string())
            .unwrap_or_else(|| panic!("missing {name} cookie"))
    };

    Session {
        access_token: value("accessToken"),
        refresh_token: value("refreshToken"),
    }
}

/// True when the response expires both session cookies.
pub fn clears_session(response: &TestResponse) -> bool {
    let cookies = set_cookies(response);
    ["accessToken", "refreshToken"].iter().all(|name| {
        cookies.iter().any(|c| {
            c.name() == *name
                && c.value().is_empty()
                && c.max_age() == Some(cookie::time::Duration::ZERO)
        })
    })
}

pub async fn register(server: &TestServer, user_name: &str, email: &str) -> Session {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "userName": user_name,
            "email": email,
            "password": PASSWORD,
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    session_from(&response)
}

pub async fn login(server: &TestServer, email: &str) -> Session {
    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;

    response.assert_status_ok();
    session_from(&response)
}

/// Creates a link and returns its short id.
pub async fn shorten(
    server: &TestServer,
    session: &Session,
    original_url: &str,
    custom_short_id: Option<&str>,
) -> String {
    let mut body = json!({ "originalUrl": original_url });
    if let Some(custom) = custom_short_id {
        body["customShortId"] = json!(custom);
    }

    let response = server
        .post("/api/v1/url")
        .add_header("cookie", session.access_cookie())
        .json(&body)
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<serde_json::Value>()["data"]["shortId"]
        .as_str()
        .unwrap()
        .to_string()
}

pub async fn create_test_user(pool: &PgPool, user_name: &str, email: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (user_name, email, password_hash) VALUES ($1, $2, 'x') RETURNING id",
    )
    .bind(user_name)
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_link(pool: &PgPool, short_id: &str, url: &str, owner_id: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (short_id, original_url, owner_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(short_id)
    .bind(url)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .unwrap()
}
