//! Access-token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::api::cookies::{ACCESS_COOKIE_NAME, read_cookie};
use crate::{error::AppError, state::AppState};

/// Authenticates requests using the access token.
///
/// # Token Sources
///
/// 1. `accessToken` cookie (browser clients)
/// 2. `Authorization: Bearer <token>` (API clients)
///
/// On success the caller's [`CurrentUser`](crate::application::services::CurrentUser)
/// is attached to the request extensions. Token expiry is final here: the
/// client is expected to call the refresh endpoint itself.
///
/// # Errors
///
/// Returns `401 Unauthorized` with:
/// - "Not authorized, no token" if neither source carries a token
/// - "Not authorized, token failed" if the token is invalid or expired
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/url", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let token = access_token(&mut parts).await.ok_or_else(|| {
        AppError::unauthorized(
            "Not authorized, no token",
            serde_json::json!({"reason": "no access cookie or bearer token"}),
        )
    })?;

    let user = st.auth_service.authenticate(&token)?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Attaches the caller when a valid access token is present and lets every
/// request through.
pub async fn optional_layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    let user = match access_token(&mut parts).await {
        Some(token) => st.auth_service.authenticate(&token).ok(),
        None => None,
    };

    let mut req = Request::from_parts(parts, body);
    if let Some(user) = user {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

async fn access_token(parts: &mut Parts) -> Option<String> {
    if let Some(token) = read_cookie(&parts.headers, ACCESS_COOKIE_NAME) {
        return Some(token);
    }

    AuthBearer::from_request_parts(parts, &())
        .await
        .ok()
        .map(|AuthBearer(token)| token)
        .filter(|t| !t.is_empty())
}
