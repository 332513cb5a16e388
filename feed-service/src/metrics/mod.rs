//! Feed Pipeline Metrics
//!
//! Prometheus metrics for the ranking/enrichment pipeline.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};
use std::time::Duration;

static FEED_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_requests_total",
        "Total feed requests (ok/error)",
        &["status"]
    )
    .expect("Failed to register feed requests metric")
});

static FEED_PHASE_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "feed_phase_duration_seconds",
        "Duration of pipeline phases",
        &["phase"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register feed phase duration metric")
});

static ENRICHMENT_DEGRADED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_enrichment_degraded_total",
        "Batch enrichments degraded to an empty mapping",
        &["source", "reason"]
    )
    .expect("Failed to register enrichment degraded metric")
});

/// Record request outcome (ok/error)
pub fn record_request(status: &str) {
    FEED_REQUESTS_TOTAL.with_label_values(&[status]).inc();
}

/// Record duration of one pipeline phase (rank/enrich/assemble)
pub fn record_phase_duration(phase: &str, duration: Duration) {
    FEED_PHASE_DURATION_SECONDS
        .with_label_values(&[phase])
        .observe(duration.as_secs_f64());
}

/// Record one enricher degrading to empty (reason: error/timeout)
pub fn record_enrichment_degraded(source: &str, reason: &str) {
    ENRICHMENT_DEGRADED_TOTAL
        .with_label_values(&[source, reason])
        .inc();
}
