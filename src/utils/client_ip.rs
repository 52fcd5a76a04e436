//! Client IP extraction from HTTP request headers.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Recorded when neither a forwarded address nor a peer address is known.
pub const UNKNOWN_IP: &str = "unknown";

/// Resolves the client IP for click recording.
///
/// Priority:
/// 1. First entry of `X-Forwarded-For`
/// 2. Peer socket address
/// 3. [`UNKNOWN_IP`]
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are collapsed to `a.b.c.d`.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "::ffff:203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// assert_eq!(client_ip(&headers, None), "203.0.113.7");
/// ```
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => normalize_ip(ip),
        (None, Some(addr)) => normalize_ip(&addr.ip().to_string()),
        (None, None) => UNKNOWN_IP.to_string(),
    }
}

/// Strips the IPv4-mapped IPv6 prefix.
pub fn normalize_ip(ip: &str) -> String {
    let ip = ip.trim();
    ip.strip_prefix("::ffff:")
        .or_else(|| ip.strip_prefix("::FFFF:"))
        .unwrap_or(ip)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_forwarded_first_entry_wins() {
        let headers = headers_with_forwarded("203.0.113.7, 10.0.0.1, 10.0.0.2");
        let peer: SocketAddr = "192.168.1.1:5000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn test_falls_back_to_peer() {
        let peer: SocketAddr = "192.168.1.1:5000".parse().unwrap();

        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), "192.168.1.1");
    }

    #[test]
    fn test_unknown_without_sources() {
        assert_eq!(client_ip(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn test_empty_forwarded_header_ignored() {
        let headers = headers_with_forwarded("");
        let peer: SocketAddr = "10.1.1.1:80".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)), "10.1.1.1");
    }

    #[test]
    fn test_mapped_ipv6_collapsed() {
        assert_eq!(normalize_ip("::ffff:127.0.0.1"), "127.0.0.1");
        assert_eq!(normalize_ip("::1"), "::1");

        let headers = headers_with_forwarded("::ffff:198.51.100.4");
        assert_eq!(client_ip(&headers, None), "198.51.100.4");
    }

    #[test]
    fn test_mapped_ipv6_peer_collapsed() {
        let peer: SocketAddr = "[::ffff:10.0.0.9]:443".parse().unwrap();

        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), "10.0.0.9");
    }
}
