//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod admin;
pub mod auth;
pub mod fallback;
pub mod health;
pub mod links;

pub use admin::{admin_analytics_handler, admin_urls_handler, admin_users_handler};
pub use auth::{login_handler, logout_handler, profile_handler, refresh_handler, register_handler};
pub use fallback::not_found_handler;
pub use health::health_handler;
pub use links::{
    analytics_handler, my_urls_handler, original_url_handler, redirect_handler, shorten_handler,
};
