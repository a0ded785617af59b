use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static SIGHTING_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sightings_requests_total",
        "Sighting requests handled, by operation and outcome",
        &["op", "outcome"]
    )
    .expect("register sightings_requests_total")
});

pub fn record(op: &str, outcome: &str) {
    SIGHTING_REQUESTS_TOTAL.with_label_values(&[op, outcome]).inc();
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
