//! Client address for the audit trail
//!
//! The socket peer address is authoritative. `X-Forwarded-For` is only consulted when
//! no peer address is known, and then only the hop in front of the trusted proxies is
//! believed.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> Option<String> {
    if let Some(addr) = socket_addr {
        return Some(addr.ip().to_string());
    }

    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| extract_from_forwarded_for(value, trusted_proxy_count))
}

/// Pick the client from `client, proxy1, proxy2, ...`.
///
/// With N trusted proxies the last N hops are skipped; with none, the hop closest to
/// us is used since everything before it is client-controlled.
fn extract_from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<String> {
    let hops: Vec<&str> = header_value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let candidate = if trusted_proxy_count == 0 || hops.len() <= trusted_proxy_count {
        hops.last()?
    } else {
        hops.get(hops.len() - trusted_proxy_count - 1)?
    };

    is_valid_ip(candidate).then(|| candidate.to_string())
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn xff(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_socket_address_preferred_over_header() {
        let socket = SocketAddr::from(([192, 0, 2, 10], 51000));
        let ip = extract_client_ip(&xff("198.51.100.1"), Some(&socket), 0);
        assert_eq!(ip.as_deref(), Some("192.0.2.10"));
    }

    #[test]
    fn test_header_used_without_socket() {
        let ip = extract_client_ip(&xff("198.51.100.1"), None, 0);
        assert_eq!(ip.as_deref(), Some("198.51.100.1"));
    }

    #[test]
    fn test_trusted_proxies_skipped() {
        assert_eq!(
            extract_from_forwarded_for("198.51.100.1, 10.0.0.1", 1).as_deref(),
            Some("198.51.100.1")
        );
        assert_eq!(
            extract_from_forwarded_for("198.51.100.1, 10.0.0.1, 10.0.0.2", 2).as_deref(),
            Some("198.51.100.1")
        );
    }

    #[test]
    fn test_untrusted_chain_uses_nearest_hop() {
        assert_eq!(
            extract_from_forwarded_for("203.0.113.5, 10.0.0.1", 0).as_deref(),
            Some("10.0.0.1")
        );
    }

    #[test]
    fn test_short_chain_falls_back_to_last_hop() {
        assert_eq!(
            extract_from_forwarded_for("198.51.100.1", 3).as_deref(),
            Some("198.51.100.1")
        );
    }

    #[test]
    fn test_invalid_values_are_none() {
        assert_eq!(extract_from_forwarded_for("not.an.ip", 0), None);
        assert_eq!(extract_from_forwarded_for(" , ", 0), None);
        assert_eq!(extract_client_ip(&HeaderMap::new(), None, 0), None);
    }

    #[test]
    fn test_is_valid_ip() {
        assert!(is_valid_ip("192.168.1.1"));
        assert!(is_valid_ip("::1"));
        assert!(!is_valid_ip("999.999.999.999"));
        assert!(!is_valid_ip(""));
    }
}
