//! In-process storage backends.

mod report_cache;

pub use report_cache::{InMemoryReportCache, ReportCacheConfig};
