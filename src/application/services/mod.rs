//! Business logic services for the application layer.

pub mod admin_service;
pub mod auth_service;
pub mod link_service;
pub mod token_service;

pub use admin_service::AdminService;
pub use auth_service::{AuthService, CurrentUser, Registration, Session};
pub use link_service::{LinkReport, LinkService};
pub use token_service::{TokenPair, TokenService};
