//! Original URL validation.
//!
//! URLs are checked, never rewritten: the stored value is exactly what the
//! client submitted.

use crate::error::AppError;
use serde_json::json;
use url::Url;

/// Checks that `input` is an absolute URL with a host.
///
/// # Errors
///
/// - [`AppError::Validation`] "Original URL is required" for a blank input
/// - [`AppError::Validation`] "Invalid URL format" when parsing fails or the
///   URL has no host (`mailto:`, `data:`, relative paths)
pub fn validate_original_url(input: &str) -> Result<(), AppError> {
    if input.trim().is_empty() {
        return Err(AppError::bad_request(
            "Original URL is required",
            json!({ "field": "originalUrl" }),
        ));
    }

    let parsed = Url::parse(input).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::bad_request(
            "Invalid URL format",
            json!({ "reason": "URL must have a host" }),
        ));
    }

    Ok(())
}
