//! Short link entity and its read models.

use chrono::{DateTime, Utc};

use super::click::Click;

/// A short identifier mapped to an original URL.
///
/// `clicks` holds the full click history in chronological order when the link
/// was loaded for analytics. Lookups that do not need the history leave it
/// empty.
#[derive(Debug, Clone)]
pub struct ShortLink {
    pub id: i64,
    pub short_id: String,
    pub custom_short_id: Option<String>,
    pub original_url: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub clicks: Vec<Click>,
}

impl ShortLink {
    /// Creates a link without click history.
    pub fn new(
        id: i64,
        short_id: String,
        custom_short_id: Option<String>,
        original_url: String,
        owner_id: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            short_id,
            custom_short_id,
            original_url,
            owner_id,
            created_at,
            clicks: Vec::new(),
        }
    }

    /// Attaches the click history.
    pub fn with_clicks(mut self, clicks: Vec<Click>) -> Self {
        self.clicks = clicks;
        self
    }

    pub fn is_custom(&self) -> bool {
        self.custom_short_id.is_some()
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub short_id: String,
    pub custom_short_id: Option<String>,
    pub original_url: String,
    pub owner_id: i64,
}

impl NewShortLink {
    /// A link with a system-generated identifier.
    pub fn generated(short_id: String, original_url: String, owner_id: i64) -> Self {
        Self {
            short_id,
            custom_short_id: None,
            original_url,
            owner_id,
        }
    }

    /// A link whose identifier was chosen by the user.
    pub fn custom(custom_short_id: String, original_url: String, owner_id: i64) -> Self {
        Self {
            short_id: custom_short_id.clone(),
            custom_short_id: Some(custom_short_id),
            original_url,
            owner_id,
        }
    }
}

/// Result of resolving a short id: where to send the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub short_id: String,
    pub original_url: String,
    pub clicked_at: DateTime<Utc>,
}

/// Link listing row with its click count.
#[derive(Debug, Clone)]
pub struct LinkSummary {
    pub short_id: String,
    pub original_url: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
}

/// Link listing row joined with its owner, for operators.
#[derive(Debug, Clone)]
pub struct OwnedLinkSummary {
    pub summary: LinkSummary,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}
