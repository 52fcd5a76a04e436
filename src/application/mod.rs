//! Application layer services implementing business logic.
//!
//! Services orchestrate repository calls, validation and business rules, and
//! give HTTP handlers a narrow API.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link creation, resolution and analytics
//! - [`services::auth_service::AuthService`] - Registration, login and refresh rotation
//! - [`services::token_service::TokenService`] - JWT minting and verification
//! - [`services::admin_service::AdminService`] - Operator views and the admin gate

pub mod services;
