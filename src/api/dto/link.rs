//! DTOs for link creation, resolution and analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::LinkReport;
use crate::domain::entities::{Click, LinkSummary, Resolution, ShortLink};

/// Request to shorten a URL.
///
/// `originalUrl` is optional at this level so a missing field yields the
/// service's "Original URL is required" instead of a generic parse error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    pub original_url: Option<String>,
    pub custom_short_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenData {
    pub short_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,
    pub original_url: String,
}

impl ShortenData {
    pub fn new(link: ShortLink, short_url: Option<String>) -> Self {
        Self {
            short_id: link.short_id,
            short_url,
            original_url: link.original_url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalData {
    pub original_url: String,
    pub short_id: String,
}

impl From<Resolution> for OriginalData {
    fn from(r: Resolution) -> Self {
        Self {
            original_url: r.original_url,
            short_id: r.short_id,
        }
    }
}

/// Analytics for a single link, as returned to its owner.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub clicks: usize,
    pub unique_clicks: usize,
    pub referrers: Vec<String>,
    pub details: Vec<Click>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,
    pub original_url: String,
    pub short_id: String,
}

impl AnalyticsData {
    pub fn new(report: LinkReport, short_url: Option<String>) -> Self {
        let LinkReport { link, analytics } = report;
        Self {
            clicks: analytics.clicks,
            unique_clicks: analytics.unique_clicks,
            referrers: analytics.referrers,
            details: analytics.details,
            short_url,
            original_url: link.original_url,
            short_id: link.short_id,
        }
    }
}

/// One row of the caller's link list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyUrlItem {
    pub short_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,
    pub original_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl MyUrlItem {
    pub fn new(summary: LinkSummary, short_url: Option<String>) -> Self {
        Self {
            short_id: summary.short_id,
            short_url,
            original_url: summary.original_url,
            clicks: summary.click_count,
            created_at: summary.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::summarize;

    #[test]
    fn test_shorten_request_camel_case() {
        let request: ShortenRequest = serde_json::from_str(
            r#"{"originalUrl": "https://example.com", "customShortId": "promo"}"#,
        )
        .unwrap();

        assert_eq!(request.original_url.as_deref(), Some("https://example.com"));
        assert_eq!(request.custom_short_id.as_deref(), Some("promo"));
    }

    #[test]
    fn test_analytics_data_shape() {
        let now = Utc::now();
        let link = ShortLink::new(
            1,
            "abc12345".to_string(),
            None,
            "https://example.com".to_string(),
            1,
            now,
        );
        let report = LinkReport {
            link,
            analytics: summarize(vec![Click::new(
                now,
                "Direct".to_string(),
                "1.2.3.4".to_string(),
                Some("curl/8.0".to_string()),
            )]),
        };

        let json = serde_json::to_value(AnalyticsData::new(report, None)).unwrap();

        assert_eq!(json["clicks"], 1);
        assert_eq!(json["uniqueClicks"], 1);
        assert_eq!(json["referrers"][0], "Direct");
        assert_eq!(json["details"][0]["ip"], "1.2.3.4");
        assert_eq!(json["details"][0]["userAgent"], "curl/8.0");
        assert_eq!(json["shortId"], "abc12345");
        assert!(json.get("shortUrl").is_none());
    }
}
