//! Request logging middleware.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use std::time::Instant;
use tracing::{info, warn};

/// Metric names for HTTP traffic.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "carebook_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "carebook_http_request_duration_seconds";
}

/// Logs each request and records its duration.
///
/// The matched route, not the raw URI, is used as the metric label so
/// identifiers never become label values.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = request
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |path| path.as_str().to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "route" => route.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, "route" => route)
        .record(duration.as_secs_f64());

    if status.is_server_error() {
        warn!(
            target: "http",
            method = %method,
            uri = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request failed"
        );
    } else {
        info!(
            target: "http",
            method = %method,
            uri = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request completed"
        );
    }

    response
}
