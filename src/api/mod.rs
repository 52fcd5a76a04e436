//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into service calls and formats
//! responses according to API contracts.
//!
//! # Modules
//!
//! - [`cookies`] - Session cookie construction and parsing
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`extract`] - Request extractors (JSON body, caller, click metadata)
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Authentication and request processing middleware
//! - [`routes`] - Route configuration and composition

pub mod cookies;
pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
