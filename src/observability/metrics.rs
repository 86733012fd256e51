//! Metrics collection and exposition.
//!
//! # Metrics
//! - `safe_url_requests_total` (counter): requests by mode, status
//! - `safe_url_request_duration_seconds` (histogram): time to response headers
//! - `safe_url_relay_aborted_total` (counter): bodies cut off mid-stream, by reason

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(mode: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "safe_url_requests_total",
        "mode" => mode,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("safe_url_request_duration_seconds", "mode" => mode)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_relay_aborted(reason: &'static str) {
    metrics::counter!("safe_url_relay_aborted_total", "reason" => reason).increment(1);
}
