//! Public short URL construction.

/// Joins the public base URL and a short id.
///
/// Returns `None` when no base is configured; responses then omit `shortUrl`.
pub fn build_short_url(base: Option<&str>, short_id: &str) -> Option<String> {
    base.map(|b| format!("{}/{}", b.trim_end_matches('/'), short_id))
}
