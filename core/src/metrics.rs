//! Engine metrics.
//!
//! Recorded through the `metrics` facade; install any recorder (for example a
//! Prometheus exporter) to collect them.

use metrics::{describe_counter, describe_histogram};

/// Responses produced, labelled by `state` and `status`.
pub const RESPONSES_TOTAL: &str = "resourceful_responses_total";

/// Time spent building a response, labelled by `state`.
pub const BUILD_DURATION_SECONDS: &str = "resourceful_build_duration_seconds";

/// Storage failures, labelled by `state` and `operation`.
pub const STORE_ERRORS_TOTAL: &str = "resourceful_store_errors_total";

/// Register descriptions for every engine metric.
pub fn describe_metrics() {
    describe_counter!(RESPONSES_TOTAL, "Total number of responses built per state and status");
    describe_histogram!(BUILD_DURATION_SECONDS, "Time taken to build a response");
    describe_counter!(STORE_ERRORS_TOTAL, "Total number of failed storage operations");
}

pub(crate) fn record_response(state: &'static str, status: http::StatusCode, seconds: f64) {
    metrics::counter!(RESPONSES_TOTAL, "state" => state, "status" => status.as_u16().to_string())
        .increment(1);
    metrics::histogram!(BUILD_DURATION_SECONDS, "state" => state).record(seconds);
}

pub(crate) fn record_store_error(state: &'static str, operation: &'static str) {
    metrics::counter!(STORE_ERRORS_TOTAL, "state" => state, "operation" => operation).increment(1);
}
