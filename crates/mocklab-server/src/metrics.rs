//! Prometheus metrics for the mock server.
//!
//! Tracks served requests, which tier and root answered them, and how often
//! fixture metadata had to be corrected.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram, CounterVec, Encoder, Histogram, TextEncoder,
};

lazy_static! {
    /// Total number of mock requests processed
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "mocklab_requests_total",
        "Total number of mock requests processed",
        &["method", "outcome"]  // outcome: served|not_found|error|rejected
    )
    .unwrap();

    /// Fixture resolutions by tier and root
    pub static ref RESOLUTIONS_TOTAL: CounterVec = register_counter_vec!(
        "mocklab_resolutions_total",
        "Fixture files selected, by search tier and root kind",
        &["tier", "root"]  // root: overlay|base
    )
    .unwrap();

    /// Out-of-range metadata replaced during decoding
    pub static ref METADATA_CORRECTIONS_TOTAL: CounterVec = register_counter_vec!(
        "mocklab_metadata_corrections_total",
        "Fixture delay or status values clamped during decoding",
        &["field"]  // field: delay|status
    )
    .unwrap();

    /// Artificial delay applied before responding
    pub static ref FIXTURE_DELAY_MS: Histogram = register_histogram!(
        "mocklab_fixture_delay_ms",
        "Histogram of fixture delays applied in milliseconds",
        vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0, 30000.0, 600000.0]
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Helper to record request processing
pub fn record_request(method: &str, outcome: &str) {
    REQUESTS_TOTAL.with_label_values(&[method, outcome]).inc();
}

/// Helper to record which tier and root answered a request
pub fn record_resolution(tier: &str, root: &str) {
    RESOLUTIONS_TOTAL.with_label_values(&[tier, root]).inc();
}

pub fn record_metadata_correction(field: &str) {
    METADATA_CORRECTIONS_TOTAL.with_label_values(&[field]).inc();
}

pub fn record_delay(delay_ms: u64) {
    FIXTURE_DELAY_MS.observe(delay_ms as f64);
}
