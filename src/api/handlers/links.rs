//! Handlers for link creation, resolution and analytics.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::api::dto::envelope::DataResponse;
use crate::api::dto::link::{AnalyticsData, MyUrlItem, OriginalData, ShortenData, ShortenRequest};
use crate::api::extract::{ApiJson, ClickContext};
use crate::application::services::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link owned by the caller.
///
/// # Endpoint
///
/// `POST /api/v1/url`
///
/// # Request Body
///
/// ```json
/// { "originalUrl": "https://example.com/page", "customShortId": "promo" }
/// ```
///
/// `customShortId` is optional; without it an 8-character id is generated.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "success": true,
///   "data": { "shortId": "promo", "shortUrl": "https://s.example.com/promo", "originalUrl": "https://example.com/page" }
/// }
/// ```
///
/// # Errors
///
/// Returns 400 for a missing or invalid URL, an invalid custom id, or a
/// custom id that is already taken.
pub async fn shorten_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<ShortenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let original_url = payload.original_url.unwrap_or_default();

    let link = state
        .link_service
        .create(user.id, &original_url, payload.custom_short_id.as_deref())
        .await?;

    let short_url = state.short_url(&link.short_id);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ShortenData::new(link, short_url))),
    ))
}

/// Resolves a short id to its original URL and records the click.
///
/// # Endpoint
///
/// `GET /api/v1/url/{short_id}/original`
///
/// For frontends that perform the navigation themselves.
///
/// # Errors
///
/// Returns 404 "URL not found" if the short id does not exist.
pub async fn original_url_handler(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    ClickContext(click): ClickContext,
) -> Result<Json<DataResponse<OriginalData>>, AppError> {
    let resolution = state.link_service.resolve(&short_id, click).await?;

    Ok(Json(DataResponse::new(resolution.into())))
}

/// Redirects a short id to its original URL.
///
/// # Endpoints
///
/// - `GET /{short_id}`
/// - `GET /api/v1/url/{short_id}`
///
/// Answers `302 Found`. Browsers do not cache it, so repeat visits reach
/// the server and are counted. The click is stored before the response is
/// sent.
///
/// # Errors
///
/// Returns 404 "URL not found" as JSON if the short id does not exist.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    ClickContext(click): ClickContext,
) -> Result<impl IntoResponse, AppError> {
    let resolution = state.link_service.resolve(&short_id, click).await?;

    tracing::debug!(%short_id, "Redirecting");

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, location(&resolution.original_url)?)],
    ))
}

/// Owner-only analytics for a link.
///
/// # Endpoint
///
/// `GET /api/v1/url/{short_id}/analytics`
///
/// # Errors
///
/// Returns 404 "URL not found" if the link does not exist or belongs to
/// another user.
pub async fn analytics_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(short_id): Path<String>,
) -> Result<Json<DataResponse<AnalyticsData>>, AppError> {
    let report = state.link_service.get_analytics(&short_id, user.id).await?;
    let short_url = state.short_url(&report.link.short_id);

    Ok(Json(DataResponse::new(AnalyticsData::new(report, short_url))))
}

/// The caller's links, newest first, with click counts.
///
/// # Endpoint
///
/// `GET /api/v1/url/myurls`, `/myurls/direct`, `/myurls/populate`
pub async fn my_urls_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DataResponse<Vec<MyUrlItem>>>, AppError> {
    let links = state.link_service.list_for_owner(user.id).await?;

    let items = links
        .into_iter()
        .map(|summary| {
            let short_url = state.short_url(&summary.short_id);
            MyUrlItem::new(summary, short_url)
        })
        .collect();

    Ok(Json(DataResponse::new(items)))
}

/// `Location` value for a stored URL.
///
/// ASCII URLs are sent as stored. Anything else goes out in its serialized
/// form (percent-encoded path, punycode host): `HeaderValue` accepts raw
/// UTF-8 bytes as obs-text, which clients decode inconsistently.
fn location(original_url: &str) -> Result<HeaderValue, AppError> {
    if original_url.is_ascii()
        && let Ok(value) = HeaderValue::from_str(original_url)
    {
        return Ok(value);
    }

    url::Url::parse(original_url)
        .ok()
        .and_then(|u| HeaderValue::from_str(u.as_str()).ok())
        .ok_or_else(|| {
            AppError::internal(
                "Stored URL cannot be used as a redirect target",
                json!({ "original_url": original_url }),
            )
        })
}
