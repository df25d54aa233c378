//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): HTTP requests by method, route, status
//! - `bridge_request_duration_seconds` (histogram): HTTP latency
//! - `bridge_chain_operations_total` (counter): contract operations by kind, outcome
//! - `bridge_chain_operation_duration_seconds` (histogram): contract operation latency
//! - `bridge_registry_entries` (gauge): flights / tickets held in memory
//! - `bridge_chain_healthy` (gauge): 1=node reachable, 0=unreachable
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "bridge_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "bridge_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one contract operation (deploy, book, read, ...).
pub fn record_operation(operation: &'static str, success: bool, start: Instant) {
    let outcome = if success { "ok" } else { "error" };
    counter!("bridge_chain_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
    histogram!("bridge_chain_operation_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record the size of an in-memory registry.
pub fn record_registry_size(registry: &'static str, size: usize) {
    gauge!("bridge_registry_entries", "registry" => registry).set(size as f64);
}

/// Record whether the chain node answered.
pub fn record_chain_health(healthy: bool) {
    gauge!("bridge_chain_healthy").set(if healthy { 1.0 } else { 0.0 });
}
