//! Request logging middleware.
//!
//! Every request gets a correlation id, taken from the `X-Request-Id`
//! header when present and generated otherwise. The id is echoed back on
//! the response and attached to the request span.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use regex_lite::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{info, info_span, Instrument};

/// Correlation id header.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Log method, normalized path, status and latency of each request.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();
    span.record("status", status);
    span.record("latency_ms", latency.as_millis() as u64);

    info!(
        target: "imprint_service::access",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Collapse dynamic path segments to keep log cardinality low.
pub fn normalize_path(path: &str) -> String {
    static OPTIONS: OnceLock<Regex> = OnceLock::new();
    let options = OPTIONS.get_or_init(|| Regex::new(r"^/api/options/[^/]+$").unwrap());

    if options.is_match(path) {
        "/api/options/:dimension".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_collapses_dimension() {
        assert_eq!(normalize_path("/api/options/author"), "/api/options/:dimension");
        assert_eq!(normalize_path("/api/options/Dynastie"), "/api/options/:dimension");
    }

    #[test]
    fn test_normalize_path_preserves_regular_path() {
        assert_eq!(normalize_path("/health/live"), "/health/live");
        assert_eq!(normalize_path("/api/graph"), "/api/graph");
    }
}
