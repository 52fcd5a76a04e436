//! Handler for unmatched routes.

use axum::http::Uri;
use serde_json::json;

use crate::error::AppError;

/// `404` with the API error envelope: `"Not found - <path>"`.
pub async fn not_found_handler(uri: Uri) -> AppError {
    AppError::not_found(
        format!("Not found - {}", uri.path()),
        json!({ "path": uri.path() }),
    )
}
