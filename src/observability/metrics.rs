//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fanout_requests_total` (counter): inbound requests by method, status
//! - `fanout_request_duration_seconds` (histogram): inbound latency
//! - `fanout_attempts_total` (counter): backend attempts by backend, outcome
//! - `fanout_attempt_duration_seconds` (histogram): per-backend attempt latency
//! - `fanout_backends` (gauge): size of the current backend set

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener. Requires a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "fanout_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("fanout_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_attempt(backend: &str, outcome: &'static str, start: Instant) {
    counter!(
        "fanout_attempts_total",
        "backend" => backend.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("fanout_attempt_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_count(count: usize) {
    gauge!("fanout_backends").set(count as f64);
}
