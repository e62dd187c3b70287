//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trellis_requests_total` (counter): requests by method, status, route
//! - `trellis_request_duration_seconds` (histogram): latency by method, route
//! - `trellis_emitted_actions_total` (counter): client actions by kind
//!
//! # Design Decisions
//! - The route label is the route template, never the raw path, to keep
//!   label cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(err) => tracing::error!(address = %addr, error = %err, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    metrics::counter!(
        "trellis_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "trellis_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_emitted_actions(kind: &'static str, count: usize) {
    metrics::counter!("trellis_emitted_actions_total", "kind" => kind).increment(count as u64);
}
