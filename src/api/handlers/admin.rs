//! Handlers for the operator endpoints.
//!
//! All routes here sit behind [`crate::api::middleware::admin::layer`].

use axum::{Json, extract::State};

use crate::api::dto::admin::{AdminAnalyticsItem, AdminUrlItem, AdminUserItem};
use crate::api::dto::envelope::ListResponse;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/v1/admin/urls`: every link with owner and click count.
pub async fn admin_urls_handler(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<AdminUrlItem>>, AppError> {
    let links = state.admin_service.list_links().await?;

    let items = links
        .into_iter()
        .map(|owned| {
            let short_url = state.short_url(&owned.summary.short_id);
            AdminUrlItem::new(owned, short_url)
        })
        .collect();

    Ok(Json(ListResponse::new(items)))
}

/// `GET /api/v1/admin/users`: every user with the number of links they own.
pub async fn admin_users_handler(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<AdminUserItem>>, AppError> {
    let users = state.admin_service.list_users().await?;

    Ok(Json(ListResponse::new(
        users.into_iter().map(AdminUserItem::from).collect(),
    )))
}

/// `GET /api/v1/admin/urls/analytics`: per-link click analytics.
pub async fn admin_analytics_handler(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<AdminAnalyticsItem>>, AppError> {
    let reports = state.admin_service.analytics_overview().await?;

    let items = reports
        .into_iter()
        .map(|report| {
            let short_url = state.short_url(&report.link.short_id);
            AdminAnalyticsItem::new(report, short_url)
        })
        .collect();

    Ok(Json(ListResponse::new(items)))
}
