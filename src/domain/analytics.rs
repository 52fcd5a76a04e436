//! Click analytics aggregation.
//!
//! Analytics are recomputed from the full click history on every call; no
//! counters are stored.

use std::collections::HashSet;

use crate::domain::entities::{Click, DIRECT_REFERRER};

/// Aggregated view of a link's click history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAnalytics {
    /// Total number of clicks.
    pub clicks: usize,
    /// Number of distinct client IPs.
    pub unique_clicks: usize,
    /// Distinct referrers in first-seen order.
    pub referrers: Vec<String>,
    /// Every click, oldest first.
    pub details: Vec<Click>,
}

/// Builds analytics from a chronologically ordered click history.
pub fn summarize(clicks: Vec<Click>) -> LinkAnalytics {
    let unique_clicks = clicks
        .iter()
        .map(|c| c.ip.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut seen = HashSet::new();
    let referrers = clicks
        .iter()
        .map(|c| {
            if c.referrer.is_empty() {
                DIRECT_REFERRER
            } else {
                c.referrer.as_str()
            }
        })
        .filter(|r| seen.insert(*r))
        .map(str::to_string)
        .collect();

    LinkAnalytics {
        clicks: clicks.len(),
        unique_clicks,
        referrers,
        details: clicks,
    }
}
