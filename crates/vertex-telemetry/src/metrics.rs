//! Metric helpers on top of the `metrics` facade.
//!
//! No exporter is installed here. Applications that want the numbers install
//! a recorder of their choice; without one every call is a no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `vertex_requests_total` | Counter | `path`, `outcome` | Requests by dotted path and success/failure |
//! | `vertex_request_duration_seconds` | Histogram | `path` | Request latency |
//! | `vertex_concurrent_requests` | Gauge | - | Requests currently admitted by the limiter |
//! | `vertex_over_capacity_total` | Counter | - | Requests rejected by the limiter |

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Registers descriptions for all standard metrics with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(
        "vertex_requests_total",
        "Total number of requests by path and outcome"
    );
    describe_histogram!(
        "vertex_request_duration_seconds",
        "Request duration in seconds"
    );
    describe_gauge!(
        "vertex_concurrent_requests",
        "Number of requests currently running"
    );
    describe_counter!(
        "vertex_over_capacity_total",
        "Requests rejected because the server was over capacity"
    );
}

/// Returns the outcome label for a request.
#[must_use]
pub const fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Records a completed request.
///
/// `path` is the dotted metric key, e.g. `users.v1.list`.
pub fn record_request(path: &str, success: bool, duration: Duration) {
    counter!(
        "vertex_requests_total",
        "path" => path.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);

    histogram!(
        "vertex_request_duration_seconds",
        "path" => path.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a request rejected for capacity.
pub fn record_over_capacity() {
    counter!("vertex_over_capacity_total").increment(1);
}

/// Sets the number of requests currently running.
#[allow(clippy::cast_precision_loss)]
pub fn set_concurrent_requests(running: usize) {
    gauge!("vertex_concurrent_requests").set(running as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome(true), "success");
        assert_eq!(outcome(false), "failure");
    }

    #[test]
    fn test_record_functions_without_recorder() {
        describe_metrics();
        record_request("users.v1.list", true, Duration::from_millis(10));
        record_request("users.v1.list", false, Duration::from_millis(3));
        record_over_capacity();
        set_concurrent_requests(4);
    }
}
