//! Prometheus metrics for the diagnostics service.
//!
//! Counters track registry mutations per server; a histogram tracks HTTP
//! handler latency per matched route.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::diagnostics::ServerId;
use crate::error::AppError;

// === Metric Name Constants ===

/// Recorded simulated requests counter metric name.
pub const METRIC_REQUESTS_RECORDED: &str = "diagnostics_requests_recorded_total";
/// Resets counter metric name.
pub const METRIC_RESETS: &str = "diagnostics_resets_total";
/// Unknown server lookups counter metric name.
pub const METRIC_UNKNOWN_SERVER: &str = "diagnostics_unknown_server_total";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";

/// Initialize all metric descriptions.
/// Call this once at startup, after installing a recorder.
pub fn init_metrics() {
    describe_counter!(
        METRIC_REQUESTS_RECORDED,
        "Total number of simulated requests recorded"
    );
    describe_counter!(METRIC_RESETS, "Total number of diagnostics resets");
    describe_counter!(
        METRIC_UNKNOWN_SERVER,
        "Total number of lookups for unknown server identifiers"
    );
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_prometheus() -> Result<PrometheusHandle, AppError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Metrics(e.to_string()))?;
    init_metrics();
    Ok(handle)
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Increment recorded requests counter.
pub fn inc_requests_recorded(server: ServerId) {
    counter!(METRIC_REQUESTS_RECORDED, "server" => server.as_str()).increment(1);
}

/// Increment resets counter.
pub fn inc_resets(server: ServerId) {
    counter!(METRIC_RESETS, "server" => server.as_str()).increment(1);
}

/// Increment unknown server counter.
pub fn inc_unknown_server() {
    counter!(METRIC_UNKNOWN_SERVER).increment(1);
}
