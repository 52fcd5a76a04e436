//! Data Transfer Objects for API requests and responses.
//!
//! Field names follow the browser frontend's camelCase convention.

pub mod admin;
pub mod auth;
pub mod envelope;
pub mod health;
pub mod link;
