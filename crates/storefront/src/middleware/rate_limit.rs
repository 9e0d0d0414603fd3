//! Rate limiting for the auth endpoints using governor and `tower_governor`.
//!
//! Login, registration and code verification share one bucket per client IP
//! so a code can't be brute-forced across endpoints.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client IP, most trusted first.
const CLIENT_IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-real-ip", "fly-client-ip"];

/// Client IP from proxy headers, falling back to the TCP peer address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    for name in CLIENT_IP_HEADERS {
        if let Some(ip) = headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Some(ip);
        }
    }

    // First hop of X-Forwarded-For.
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        ip_from_headers(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Auth endpoints: one request every 6 seconds per IP, burst of 10.
///
/// # Panics
///
/// Never in practice: both settings are non-zero constants, which
/// `GovernorConfigBuilder` always accepts.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(10)
        .finish()
        .expect("per_second(6) and burst_size(10) are valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_cloudflare_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        assert_eq!(
            ip_from_headers(&headers),
            Some("203.0.113.7".parse().expect("ip"))
        );
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 198.51.100.4 , 10.0.0.2"));
        assert_eq!(
            ip_from_headers(&headers),
            Some("198.51.100.4".parse().expect("ip"))
        );
    }

    #[test]
    fn test_garbage_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("not-an-ip"));
        assert_eq!(ip_from_headers(&headers), None);
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = Request::new(());
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 9], 50123))));
        assert_eq!(
            tower_governor::key_extractor::KeyExtractor::extract(&ClientIpKeyExtractor, &req)
                .ok(),
            Some("192.0.2.9".parse().expect("ip"))
        );
    }
}
