//! Operator-only route guard.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::application::services::CurrentUser;
use crate::{error::AppError, state::AppState};

/// Lets the request through only for the configured admin account.
///
/// Must run after [`super::auth::layer`], which attaches the caller.
///
/// # Errors
///
/// Returns `401 Unauthorized` "Admin access required".
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = req
        .extensions()
        .get::<CurrentUser>()
        .map(|u| u.id)
        .ok_or_else(|| {
            AppError::unauthorized(
                "Not authorized, no token",
                serde_json::json!({"reason": "admin guard ran before authentication"}),
            )
        })?;

    st.admin_service.ensure_admin(user_id).await?;

    Ok(next.run(req).await)
}
