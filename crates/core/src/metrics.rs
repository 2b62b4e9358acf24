//! Metrics definitions for the burn engine.
//!
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`. Without an installed
//! recorder every call here is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

use crate::models::FailureKind;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "validators_processed_total",
        "Total number of validator records successfully processed"
    );
    describe_counter!(
        "validator_errors_total",
        "Total number of validators excluded from a report, by failure stage"
    );
    describe_counter!(
        "commission_issues_total",
        "Total number of commission-rate compliance issues detected"
    );
    describe_counter!(
        "reports_generated_total",
        "Total number of burn reports generated"
    );
    describe_histogram!(
        "report_generation_duration_seconds",
        "Time taken to fetch data and build a burn report in seconds"
    );
    describe_counter!(
        "report_cache_hits_total",
        "Total number of report cache hits"
    );
    describe_counter!(
        "report_cache_misses_total",
        "Total number of report cache misses (absent or expired)"
    );
}

/// Record a successfully processed validator.
pub fn record_validator_processed() {
    counter!("validators_processed_total").increment(1);
}

/// Record a validator that was excluded from a report.
///
/// # Arguments
/// * `kind` - Stage at which it failed ("fetch" or "processing")
pub fn record_validator_error(kind: FailureKind) {
    counter!("validator_errors_total", "kind" => kind.as_str()).increment(1);
}

/// Record detected commission issues.
pub fn record_commission_issues(count: u64) {
    counter!("commission_issues_total").increment(count);
}

/// Record a generated report.
pub fn record_report_generated() {
    counter!("reports_generated_total").increment(1);
}

/// Record report generation duration.
pub fn record_report_generation_duration(duration_secs: f64) {
    histogram!("report_generation_duration_seconds").record(duration_secs);
}

pub fn record_cache_hit() {
    counter!("report_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    counter!("report_cache_misses_total").increment(1);
}

/// A timer that records report generation duration when dropped.
pub struct ReportTimer {
    start: Instant,
}

impl ReportTimer {
    /// Start a new report timer.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for ReportTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReportTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_report_generation_duration(duration);
    }
}
