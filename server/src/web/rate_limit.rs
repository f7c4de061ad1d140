use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{ConnectInfo, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::engine::rate_limiter::RateLimiter;

/// Extract client IP from request, only trusting proxy headers from loopback.
///
/// A loopback peer means a local reverse proxy sits in front of us, so
/// X-Forwarded-For / X-Real-IP are honored. Any other peer is keyed by its
/// socket address so clients cannot pick their own bucket.
fn client_ip(req: &Request<Body>) -> String {
    let peer_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|c| c.0.ip());
    let from_loopback = peer_ip.is_some_and(|ip| ip.is_loopback());

    if from_loopback {
        if let Some(forwarded) = req.headers().get("x-forwarded-for")
            && let Ok(val) = forwarded.to_str()
            && let Some(first) = val.split(',').next()
        {
            return first.trim().to_string();
        }

        if let Some(real_ip) = req.headers().get("x-real-ip")
            && let Ok(val) = real_ip.to_str()
        {
            return val.trim().to_string();
        }
    }

    peer_ip
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Per-IP limit for every API route. The limiter is injected as a request
/// extension by the router.
pub async fn api_rate_limit(req: Request<Body>, next: Next) -> Response {
    if let Some(limiter) = req.extensions().get::<Arc<RateLimiter>>() {
        let ip = client_ip(&req);
        if !limiter.check(&ip) {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "success": false,
                    "error": "rate_limited",
                    "message": "Rate limit exceeded. Please try again later.",
                })),
            )
                .into_response();
        }
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    fn request(peer: Option<IpAddr>, forwarded: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/health");
        if let Some(fwd) = forwarded {
            builder = builder.header("x-forwarded-for", fwd);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        if let Some(ip) = peer {
            req.extensions_mut()
                .insert(ConnectInfo(SocketAddr::new(ip, 40000)));
        }
        req
    }

    #[test]
    fn test_forwarded_header_trusted_from_loopback() {
        let req = request(
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            Some("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn test_forwarded_header_ignored_from_remote_peer() {
        let req = request(
            Some(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 2))),
            Some("203.0.113.7"),
        );
        assert_eq!(client_ip(&req), "198.51.100.2");
    }

    #[test]
    fn test_unknown_without_connect_info() {
        assert_eq!(client_ip(&request(None, None)), "unknown");
    }
}
