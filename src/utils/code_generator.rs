//! Short id generation and validation utilities.
//!
//! Generated ids are random and URL-safe; custom ids are user-chosen and
//! validated against a fixed alphabet and a list of reserved route segments.

use crate::error::AppError;
use base64::Engine as _;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Random bytes per generated id. 6 bytes encode to exactly 8 base64 characters.
const SHORT_ID_BYTES: usize = 6;

/// Length of a generated short id.
pub const SHORT_ID_LENGTH: usize = 8;

/// Custom ids share the URL namespace with these top-level routes.
const RESERVED_SHORT_IDS: &[&str] = &["api", "health", "admin", "auth", "myurls"];

static CUSTOM_SHORT_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]{3,30}$").unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Generates a random short id from `[A-Za-z0-9_-]`.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn generate_short_id() -> Result<String, AppError> {
    let mut buffer = [0u8; SHORT_ID_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Validates a user-provided custom short id.
///
/// # Rules
///
/// - 3-30 characters from `[a-zA-Z0-9_-]`
/// - Not a reserved route segment (case-insensitive)
///
/// # Errors
///
/// Returns [`AppError::Validation`] if a rule is violated.
pub fn validate_custom_short_id(custom_short_id: &str) -> Result<(), AppError> {
    if !CUSTOM_SHORT_ID_REGEX.is_match(custom_short_id) {
        return Err(AppError::bad_request(
            "Custom short ID can only contain letters, numbers, underscores, and hyphens (3-30 characters)",
            json!({ "custom_short_id": custom_short_id }),
        ));
    }

    if RESERVED_SHORT_IDS
        .iter()
        .any(|r| r.eq_ignore_ascii_case(custom_short_id))
    {
        return Err(AppError::bad_request(
            "This short ID is reserved",
            json!({ "custom_short_id": custom_short_id }),
        ));
    }

    Ok(())
}
