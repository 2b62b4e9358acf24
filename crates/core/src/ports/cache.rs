//! Port trait for report caching.
//!
//! Caching is an outer-layer concern: the core never consults the cache
//! itself. Implementations live in `tacburn-storage`.

use std::sync::Arc;

use crate::models::BurnReport;

/// Report cache keyed by period label (`YYYY-MM`).
pub trait ReportCache: Send + Sync {
    /// Get a fresh report for the period, if any.
    fn get(&self, period: &str) -> Option<Arc<BurnReport>>;

    /// Store a report, replacing any previous entry for the period.
    fn put(&self, period: &str, report: Arc<BurnReport>);

    /// Drop the entry for a period. Returns whether one existed.
    fn invalidate(&self, period: &str) -> bool;

    /// Drop every entry.
    fn clear(&self);
}
