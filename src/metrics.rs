/// Metrics and telemetry for the agent store
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - HTTP request counts by method and status
/// - Blob store operation counts, outcomes and latencies

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Total HTTP requests by method and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "status"]
    )
    .unwrap();

    /// Blob store calls by operation and outcome (ok, not_found, error)
    pub static ref BLOB_STORE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blob_store_operations_total",
        "Total number of blob store operations",
        &["operation", "outcome"]
    )
    .unwrap();

    /// Blob store call duration in seconds
    pub static ref BLOB_STORE_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "blob_store_operation_duration_seconds",
        "Blob store operation latencies in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .unwrap();
}

/// Record one HTTP request
pub fn record_http_request(method: &str, status: u16) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, &status.to_string()])
        .inc();
}

/// Record one blob store call
pub fn record_blob_operation(operation: &str, outcome: &str, duration_secs: f64) {
    BLOB_STORE_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    BLOB_STORE_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration_secs);
}

/// Render all registered metrics in the Prometheus text format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
