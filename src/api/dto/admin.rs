//! DTOs for the operator endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::LinkReport;
use crate::domain::entities::{OwnedLinkSummary, UserSummary};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOwner {
    pub id: i64,
    pub user_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUrlItem {
    pub short_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,
    pub original_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    /// `null` if the owner row is gone.
    pub user: Option<LinkOwner>,
}

impl AdminUrlItem {
    pub fn new(owned: OwnedLinkSummary, short_url: Option<String>) -> Self {
        let OwnedLinkSummary {
            summary,
            owner_name,
            owner_email,
        } = owned;

        let user = match (owner_name, owner_email) {
            (Some(user_name), Some(email)) => Some(LinkOwner {
                id: summary.owner_id,
                user_name,
                email,
            }),
            _ => None,
        };

        Self {
            short_id: summary.short_id,
            short_url,
            original_url: summary.original_url,
            clicks: summary.click_count,
            created_at: summary.created_at,
            user,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserItem {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub url_count: i64,
}

impl From<UserSummary> for AdminUserItem {
    fn from(u: UserSummary) -> Self {
        Self {
            id: u.id,
            user_name: u.user_name,
            email: u.email,
            created_at: u.created_at,
            url_count: u.link_count,
        }
    }
}

/// Per-link analytics without the click details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAnalyticsItem {
    pub short_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,
    pub original_url: String,
    pub clicks: usize,
    pub unique_clicks: usize,
    pub referrers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl AdminAnalyticsItem {
    pub fn new(report: LinkReport, short_url: Option<String>) -> Self {
        let LinkReport { link, analytics } = report;
        Self {
            short_id: link.short_id,
            short_url,
            original_url: link.original_url,
            clicks: analytics.clicks,
            unique_clicks: analytics.unique_clicks,
            referrers: analytics.referrers,
            created_at: link.created_at,
        }
    }
}
