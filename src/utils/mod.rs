//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short id generation and custom id validation
//! - [`url_validator`] - Original URL checks
//! - [`client_ip`] - Client IP resolution for click recording
//! - [`password`] - bcrypt hashing on the blocking pool
//! - [`short_url`] - Public short URL construction

pub mod client_ip;
pub mod code_generator;
pub mod password;
pub mod short_url;
pub mod url_validator;
