//! Request extractors shared by the API handlers.

use axum::{
    Json,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{HeaderMap, header, request::Parts},
};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::application::services::CurrentUser;
use crate::domain::entities::NewClick;
use crate::error::AppError;
use crate::utils::client_ip::client_ip;

/// JSON body whose rejections use the API error envelope.
///
/// Plain [`Json`] answers a malformed body with a text/plain response; this
/// wrapper turns every rejection into a `400` with `{success, error}`.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::bad_request(
                "Invalid JSON payload",
                json!({
                    "status": rejection.status().as_u16(),
                    "reason": rejection.body_text(),
                }),
            )),
        }
    }
}

/// The authenticated caller, attached by [`crate::api::middleware::auth::layer`].
///
/// Rejects with `401` when used on a route without the auth middleware.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            AppError::unauthorized(
                "Not authorized, no token",
                json!({ "reason": "no authenticated user on request" }),
            )
        })
    }
}

/// The caller if a valid access token was presented, `None` otherwise.
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Visitor metadata recorded with every resolution.
pub struct ClickContext(pub NewClick);

impl<S> FromRequestParts<S> for ClickContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self(click_from_headers(&parts.headers, peer)))
    }
}

fn click_from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> NewClick {
    // Both spellings are seen in the wild.
    let referrer = headers
        .get(header::REFERER)
        .or_else(|| headers.get("referrer"))
        .and_then(|v| v.to_str().ok());

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    NewClick::new(referrer, client_ip(headers, peer), user_agent)
}
