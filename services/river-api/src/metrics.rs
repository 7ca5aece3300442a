//! Prometheus metrics for the service.
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder (tests, embedded use) the calls are no-ops.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Names of the recorded series.
pub mod names {
    pub const REQUESTS: &str = "river_requests_total";
    pub const ERRORS: &str = "river_errors_total";
    pub const PROCESS_REQUESTS: &str = "river_process_requests_total";
    pub const PROCESS_POINTS: &str = "river_process_points_total";
    pub const PROCESS_CLIPPED: &str = "river_process_clipped_total";
    pub const PROCESS_DURATION_MS: &str = "river_process_duration_ms";
    pub const DOWNLOAD_BYTES: &str = "river_download_bytes_total";
    pub const SEARCH_GRANULES: &str = "river_search_granules_total";
}

/// Install the global Prometheus recorder.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

pub struct ApiMetrics;

impl ApiMetrics {
    pub fn record_request(endpoint: &'static str) {
        counter!(names::REQUESTS, "endpoint" => endpoint).increment(1);
    }

    pub fn record_error(kind: &'static str) {
        counter!(names::ERRORS, "kind" => kind).increment(1);
    }

    /// Record a completed projection run.
    pub fn record_process(input_count: usize, clipped_count: usize, duration_ms: f64) {
        counter!(names::PROCESS_REQUESTS).increment(1);
        counter!(names::PROCESS_POINTS).increment(input_count as u64);
        counter!(names::PROCESS_CLIPPED).increment(clipped_count as u64);
        histogram!(names::PROCESS_DURATION_MS).record(duration_ms);
    }

    pub fn record_download(bytes: usize) {
        counter!(names::DOWNLOAD_BYTES).increment(bytes as u64);
    }

    pub fn record_search(granules: usize) {
        counter!(names::SEARCH_GRANULES).increment(granules as u64);
    }
}
