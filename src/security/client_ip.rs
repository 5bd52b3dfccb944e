//! Client address derivation for rate-limit keys.
//!
//! Forwarded headers are only believed when the connecting peer is a
//! configured trusted proxy (or when every peer is trusted). Otherwise the
//! socket address is the key, and a client cannot pick its own bucket.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

use crate::config::ClientIpConfig;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Key used when nothing identifies the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Default)]
pub struct ClientIpResolver {
    trusted: Vec<IpAddr>,
    trust_all: bool,
}

impl ClientIpResolver {
    pub fn new(trusted: Vec<IpAddr>, trust_all: bool) -> Self {
        Self { trusted, trust_all }
    }

    /// Build from config. Unparseable entries are skipped; validation
    /// reports them before startup.
    pub fn from_config(config: &ClientIpConfig) -> Self {
        let trusted = config
            .trusted_proxies
            .iter()
            .filter_map(|p| p.parse().ok())
            .collect();
        Self::new(trusted, config.trust_all_proxies)
    }

    fn trusts(&self, peer: Option<IpAddr>) -> bool {
        self.trust_all || peer.is_some_and(|ip| self.trusted.contains(&ip))
    }

    /// Best-effort client key for a request.
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        let peer_ip = peer.map(|addr| addr.ip());

        if self.trusts(peer_ip) {
            if let Some(ip) = forwarded_ip(headers) {
                return ip;
            }
        }

        peer_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

/// First `X-Forwarded-For` hop, else `X-Real-IP`.
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let first_hop = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    first_hop
        .or_else(|| {
            headers
                .get(X_REAL_IP)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    fn peer(ip: &str) -> Option<SocketAddr> {
        Some(SocketAddr::new(ip.parse().unwrap(), 40000))
    }

    #[test]
    fn test_untrusted_peer_ignores_forwarded_headers() {
        let resolver = ClientIpResolver::default();
        let h = headers(&[("x-forwarded-for", "9.9.9.9")]);
        assert_eq!(resolver.client_key(&h, peer("10.0.0.5")), "10.0.0.5");
    }

    #[test]
    fn test_trusted_proxy_uses_first_hop() {
        let resolver = ClientIpResolver::new(vec!["10.0.0.1".parse().unwrap()], false);
        let h = headers(&[("x-forwarded-for", " 203.0.113.7 , 10.0.0.1")]);
        assert_eq!(resolver.client_key(&h, peer("10.0.0.1")), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let resolver = ClientIpResolver::new(Vec::new(), true);
        let h = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(resolver.client_key(&h, None), "198.51.100.2");
    }

    #[test]
    fn test_unknown_client() {
        let resolver = ClientIpResolver::default();
        assert_eq!(resolver.client_key(&HeaderMap::new(), None), UNKNOWN_CLIENT);
    }
}
