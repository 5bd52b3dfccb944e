//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_rate_limited_total` (counter): rejected auth attempts by path
//! - `gateway_guard_redirects_total` (counter): guard redirects by target
//! - `gateway_upstream_requests_total` (counter): upstream calls by outcome
//! - `gateway_rate_limit_entries` (gauge): tracked rate-limit keys
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(path: &str) {
    counter!("gateway_rate_limited_total", "path" => path.to_string()).increment(1);
}

pub fn record_guard_redirect(target: &'static str) {
    counter!("gateway_guard_redirects_total", "target" => target).increment(1);
}

pub fn record_upstream(outcome: &'static str) {
    counter!("gateway_upstream_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limit_entries(entries: usize) {
    gauge!("gateway_rate_limit_entries").set(entries as f64);
}

/// Request counter and latency middleware. Routes are labelled by their
/// matched pattern so ids do not explode cardinality; page navigations share
/// one label.
pub async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "page".to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
