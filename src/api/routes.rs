//! API route configuration.
//!
//! Everything here is nested under `/api/v1` by [`crate::routes::app_router`].

use crate::api::handlers::{
    admin_analytics_handler, admin_urls_handler, admin_users_handler, analytics_handler,
    login_handler, logout_handler, my_urls_handler, original_url_handler, profile_handler,
    redirect_handler, refresh_handler, register_handler, shorten_handler,
};
use crate::api::middleware::{admin, auth};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// All `/api/v1` routes.
///
/// # Endpoints
///
/// Public:
/// - `POST /auth/register`            - Create an account
/// - `POST /auth/login`               - Sign in
/// - `POST /auth/logout`              - Sign out (token optional)
/// - `POST /auth/refresh`             - Rotate the refresh token (alias `/auth/refresh-token`)
/// - `GET  /url/{short_id}/original`  - Resolve to JSON and record the click
/// - `GET  /url/{short_id}`           - Resolve with a redirect and record the click
///
/// Authenticated:
/// - `GET  /auth/profile`             - The caller's profile
/// - `POST /url`                      - Shorten a URL
/// - `GET  /url/myurls`               - The caller's links
///   (also `/url/myurls/direct` and `/url/myurls/populate`)
/// - `GET  /url/{short_id}/analytics` - Owner-only analytics
///
/// Admin:
/// - `GET  /admin/urls`               - All links
/// - `GET  /admin/users`              - All users
/// - `GET  /admin/urls/analytics`     - Analytics for all links
pub fn api_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route("/auth/refresh-token", post(refresh_handler))
        .route("/url/{short_id}/original", get(original_url_handler))
        .route("/url/{short_id}", get(redirect_handler));

    let logout = Router::new()
        .route("/auth/logout", post(logout_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional_layer,
        ));

    let protected = Router::new()
        .route("/auth/profile", get(profile_handler))
        .route("/url", post(shorten_handler))
        .route("/url/myurls", get(my_urls_handler))
        .route("/url/myurls/direct", get(my_urls_handler))
        .route("/url/myurls/populate", get(my_urls_handler))
        .route("/url/{short_id}/analytics", get(analytics_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    // The last layer added runs first: authenticate, then check admin.
    let admin = Router::new()
        .route("/admin/urls", get(admin_urls_handler))
        .route("/admin/users", get(admin_users_handler))
        .route("/admin/urls/analytics", get(admin_analytics_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::layer))
        .route_layer(middleware::from_fn_with_state(state, auth::layer));

    Router::new()
        .merge(public)
        .merge(logout)
        .merge(protected)
        .merge(admin)
}
