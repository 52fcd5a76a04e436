//! HTTP middleware for request processing and protection.
//!
//! Provides authentication, the admin guard, CORS and observability middleware.

pub mod admin;
pub mod auth;
pub mod cors;
pub mod tracing;
