//! Storage layer for the burn engine.
//!
//! This crate provides implementations of the [`ReportCache`] port defined
//! in `tacburn-core`. Reports are cached per period label so repeated
//! requests within the TTL do not hit the chain again.
//!
//! # Usage
//!
//! ```ignore
//! use tacburn_storage::{InMemoryReportCache, ReportCacheConfig};
//!
//! let cache = Arc::new(InMemoryReportCache::new(ReportCacheConfig {
//!     ttl: Duration::from_secs(300),
//! }));
//!
//! if let Some(report) = cache.get("2026-09") {
//!     return Ok(report);
//! }
//! ```
//!
//! [`ReportCache`]: tacburn_core::ports::ReportCache

pub mod memory;

pub use memory::{InMemoryReportCache, ReportCacheConfig};
