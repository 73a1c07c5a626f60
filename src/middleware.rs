use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::info;

use crate::request_counter::RequestCounter;

/// Count every request in the current minute bucket before it is handled.
pub async fn count_requests(
    State(counter): State<RequestCounter>,
    request: Request,
    next: Next,
) -> Response {
    counter.increment().await;
    next.run(request).await
}

/// Logging middleware for request/response tracking
pub async fn logging_middleware(
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = client_ip(request.headers(), remote);

    info!(
        target: "request_logger::middleware",
        method = %method,
        uri = %uri,
        client_ip = %client_ip,
        "Incoming request"
    );

    let response = next.run(request).await;

    let status = response.status();
    info!(
        target: "request_logger::middleware",
        method = %method,
        uri = %uri,
        status = %status,
        "Request completed"
    );

    response
}

/// Best guess at the caller's address: proxy headers first, then the peer.
pub fn client_ip(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return first_ip.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            let ip_str = ip_str.trim();
            if !ip_str.is_empty() {
                return ip_str.to_string();
            }
        }
    }

    match remote {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_with_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("192.168.1.1, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.1"));

        assert_eq!(client_ip(&headers, None), "192.168.1.1");
    }

    #[test]
    fn test_client_ip_with_real_ip_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.1"));

        assert_eq!(client_ip(&headers, None), "203.0.113.1");
    }

    #[test]
    fn test_client_ip_skips_empty_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        headers.insert("x-real-ip", HeaderValue::from_static(""));
        let remote: SocketAddr = "198.51.100.7:53211".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(remote)), "198.51.100.7");
        assert_eq!(client_ip(&headers, None), "unknown");
    }

    #[test]
    fn test_client_ip_from_peer_address() {
        let remote: SocketAddr = "198.51.100.7:53211".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(remote)), "198.51.100.7");
    }

    #[test]
    fn test_client_ip_fallback() {
        assert_eq!(client_ip(&HeaderMap::new(), None), "unknown");
    }
}
