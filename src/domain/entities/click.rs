//! Click entity representing a single resolution of a short link.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Referrer recorded when the request carried none.
pub const DIRECT_REFERRER: &str = "Direct";

/// A click recorded when a short link is resolved.
///
/// Clicks are append-only: once stored they are never modified. The
/// timestamp is assigned by the store, not by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Click {
    #[serde(rename = "timestamp")]
    pub clicked_at: DateTime<Utc>,
    pub referrer: String,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Click {
    pub fn new(
        clicked_at: DateTime<Utc>,
        referrer: String,
        ip: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            clicked_at,
            referrer,
            ip,
            user_agent,
        }
    }
}

/// Request metadata for a click that is about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub referrer: String,
    pub ip: String,
    pub user_agent: Option<String>,
}

impl NewClick {
    /// Builds click metadata, substituting [`DIRECT_REFERRER`] for a missing
    /// or blank referrer.
    pub fn new(referrer: Option<&str>, ip: impl Into<String>, user_agent: Option<&str>) -> Self {
        let referrer = referrer
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DIRECT_REFERRER)
            .to_string();

        Self {
            referrer,
            ip: ip.into(),
            user_agent: user_agent.map(str::to_string),
        }
    }
}
