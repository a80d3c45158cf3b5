//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Install the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "tryon_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tryon_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "tryon_http_requests_in_flight";

    // Proxy metrics
    pub const TRYON_REQUESTS_TOTAL: &str = "tryon_proxy_requests_total";
    pub const TRYON_UPSTREAM_DURATION_SECONDS: &str = "tryon_proxy_upstream_duration_seconds";

    // Overlay metrics
    pub const OVERLAYS_RENDERED_TOTAL: &str = "tryon_overlays_rendered_total";
    pub const OVERLAY_DURATION_SECONDS: &str = "tryon_overlay_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", route_label(path).to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the outcome of a try-on proxy request.
pub fn record_tryon_outcome(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::TRYON_REQUESTS_TOTAL, &labels).increment(1);
}

/// Record how long the upstream model took.
pub fn record_upstream_duration(duration_secs: f64) {
    histogram!(names::TRYON_UPSTREAM_DURATION_SECONDS).record(duration_secs);
}

/// Record a rendered overlay.
pub fn record_overlay(garment_drawn: bool, duration_secs: f64) {
    let labels = [("garment", garment_drawn.to_string())];
    counter!(names::OVERLAYS_RENDERED_TOTAL, &labels).increment(1);
    histogram!(names::OVERLAY_DURATION_SECONDS).record(duration_secs);
}

/// Map a request path to a bounded label set.
fn route_label(path: &str) -> &'static str {
    match path {
        "/api/tryon" => "/api/tryon",
        "/api/overlay" => "/api/overlay",
        "/health" | "/healthz" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        _ => "other",
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_label() {
        assert_eq!(route_label("/api/tryon"), "/api/tryon");
        assert_eq!(route_label("/healthz"), "/health");
        assert_eq!(route_label("/api/tryon/../../etc/passwd"), "other");
        assert_eq!(route_label("/random/123"), "other");
    }
}
