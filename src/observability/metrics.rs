//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hanbok_route_requests_total` (counter): dispatched requests by method, route, status
//! - `hanbok_route_duration_seconds` (histogram): pipeline latency by method, route
//! - `hanbok_client_calls_total` (counter): client calls by method, route template
//!
//! # Design Decisions
//! - The route label is the declared template, never the concrete path,
//!   so label cardinality stays bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routes::RouteMethod;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(method: RouteMethod, route: &str, status: u16, started: Instant) {
    ::metrics::counter!(
        "hanbok_route_requests_total",
        "method" => method.as_str(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "hanbok_route_duration_seconds",
        "method" => method.as_str(),
        "route" => route.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

pub fn record_client_call(method: RouteMethod, route: &str) {
    ::metrics::counter!(
        "hanbok_client_calls_total",
        "method" => method.as_str(),
        "route" => route.to_string()
    )
    .increment(1);
}
