use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderMap;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const WALLET_HEADER: &str = "x-wallet-address";

/// Peers whose `X-Forwarded-For` header is believed. Empty ignores the header.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<[IpAddr]>);

impl TrustedProxies {
    pub fn new(proxies: Vec<IpAddr>) -> Self {
        Self(proxies.into())
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.0.contains(&ip)
    }
}

/// The peer address, or the first `X-Forwarded-For` entry when the peer is a
/// trusted proxy. `unknown` without connection info.
pub fn client_ip(req: &Request, trusted: &TrustedProxies) -> String {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    client_ip_from(req.headers(), peer, trusted)
}

pub fn client_ip_from(headers: &HeaderMap, peer: Option<SocketAddr>, trusted: &TrustedProxies) -> String {
    let Some(peer) = peer else {
        return "unknown".to_string();
    };
    if !trusted.contains(peer.ip()) {
        return peer.ip().to_string();
    }

    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}

pub fn wallet_address(headers: &HeaderMap) -> Option<String> {
    headers
        .get(WALLET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|wallet| !wallet.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR_HEADER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn forwarded_for_is_ignored_from_untrusted_peers() {
        let peer = Some(SocketAddr::from(([198, 51, 100, 7], 4000)));
        let trusted = TrustedProxies::default();

        assert_eq!(client_ip_from(&forwarded("203.0.113.9"), peer, &trusted), "198.51.100.7");
        assert_eq!(client_ip_from(&HeaderMap::new(), peer, &trusted), "198.51.100.7");
        assert_eq!(client_ip_from(&HeaderMap::new(), None, &trusted), "unknown");
    }

    #[test]
    fn trusted_proxy_forwards_the_first_entry() {
        let proxy = SocketAddr::from(([10, 0, 0, 1], 4000));
        let trusted = TrustedProxies::new(vec![proxy.ip()]);

        assert_eq!(
            client_ip_from(&forwarded("203.0.113.9, 10.0.0.1"), Some(proxy), &trusted),
            "203.0.113.9"
        );
        assert_eq!(client_ip_from(&HeaderMap::new(), Some(proxy), &trusted), "10.0.0.1");
    }

    #[test]
    fn blank_wallet_is_absent() {
        let mut headers = HeaderMap::new();
        assert_eq!(wallet_address(&headers), None);

        headers.insert(WALLET_HEADER, HeaderValue::from_static("  "));
        assert_eq!(wallet_address(&headers), None);

        headers.insert(WALLET_HEADER, HeaderValue::from_static("0xabc"));
        assert_eq!(wallet_address(&headers).as_deref(), Some("0xabc"));
    }
}
