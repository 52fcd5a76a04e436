//! Domain layer containing business entities and logic.
//!
//! Defines entities, repository interfaces and pure computations that do not
//! depend on storage or HTTP.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`analytics`] - Click history aggregation
//!
//! # Resolution Flow
//!
//! 1. HTTP handler extracts click metadata from the request
//! 2. [`crate::application::services::LinkService::resolve`] calls
//!    [`repositories::LinkRepository::record_click`]
//! 3. The lookup and the click append happen in one statement
//! 4. The handler responds only after the click is stored

pub mod analytics;
pub mod entities;
pub mod repositories;
