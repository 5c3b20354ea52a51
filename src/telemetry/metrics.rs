//! Classification metrics via the `metrics` facade.
//!
//! No recorder is installed here; without one these calls are no-ops.

use std::time::Duration;

pub const CLASSIFY_TOTAL: &str = "bloom_classify_requests_total";
pub const CLASSIFY_LATENCY: &str = "bloom_classify_latency_seconds";
pub const MODEL_LOADS: &str = "bloom_model_loads_total";

/// Count one finished classification and its latency.
pub fn record_classification(outcome: &'static str, latency: Duration) {
    ::metrics::counter!(CLASSIFY_TOTAL, "outcome" => outcome).increment(1);
    ::metrics::histogram!(CLASSIFY_LATENCY, "outcome" => outcome).record(latency.as_secs_f64());
}

/// Count one model construction.
pub fn record_model_load(backend: &'static str) {
    ::metrics::counter!(MODEL_LOADS, "backend" => backend).increment(1);
}
