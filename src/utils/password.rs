//! Password hashing on the blocking thread pool.
//!
//! bcrypt is CPU-bound by design, so both hashing and verification run in
//! [`tokio::task::spawn_blocking`] to keep request tasks responsive.

use crate::error::AppError;
use serde_json::json;

/// Hashes `password` with bcrypt at the given cost.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if bcrypt fails or the blocking task panics.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            AppError::internal("Password hashing task failed", json!({ "reason": e.to_string() }))
        })?
        .map_err(|e| AppError::internal("Password hashing failed", json!({ "reason": e.to_string() })))
}

/// Checks `password` against a stored bcrypt hash.
///
/// A malformed stored hash is reported as an internal error, not as a
/// mismatch.
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| {
            AppError::internal(
                "Password verification task failed",
                json!({ "reason": e.to_string() }),
            )
        })?
        .map_err(|e| {
            AppError::internal(
                "Password verification failed",
                json!({ "reason": e.to_string() }),
            )
        })
}
