//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{short_id}`  - Short link redirect (public)
//! - `GET  /health`      - Health check: database (public)
//! - `/api/v1/*`         - REST API (cookie or Bearer access token where required)
//! - anything else       - `404 {"success": false, "error": "Not found - <path>"}`
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Credentialed requests from the configured frontend origins
//! - **Authentication** - Access token from cookie or `Authorization` header
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, not_found_handler, redirect_handler};
use crate::api::middleware::{cors, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// `cors_origins` lists the browser origins allowed to send credentialed
/// requests.
pub fn app_router(state: AppState, cors_origins: &[String]) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, cors_origins))
}

/// All routes and middleware without path normalization.
///
/// Path normalization has to wrap the router from outside to run before
/// routing, which is what [`app_router`] does.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/{short_id}", get(redirect_handler))
        .nest("/api/v1", api::routes::api_routes(state.clone()))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(cors::layer(cors_origins))
        .layer(tracing::layer())
}
