//! TTL report cache keyed by period label.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, trace};

use tacburn_core::metrics::{record_cache_hit, record_cache_miss};
use tacburn_core::models::BurnReport;
use tacburn_core::ports::ReportCache;

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct ReportCacheConfig {
    /// How long a report is served before it must be regenerated.
    pub ttl: Duration,
}

impl Default for ReportCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
        }
    }
}

struct Entry {
    report: Arc<BurnReport>,
    stored_at: Instant,
}

/// Thread-safe report cache with lazy expiry.
///
/// Expired entries count as misses and are evicted on the lookup that
/// finds them.
pub struct InMemoryReportCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryReportCache {
    pub fn new(config: ReportCacheConfig) -> Self {
        Self {
            ttl: config.ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn get_at(&self, period: &str, now: Instant) -> Option<Arc<BurnReport>> {
        {
            let entries = self.entries.read();
            match entries.get(period) {
                None => {
                    record_cache_miss();
                    return None;
                }
                Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                    trace!(period, "Report cache hit");
                    record_cache_hit();
                    return Some(Arc::clone(&entry.report));
                }
                Some(_) => {}
            }
        }

        self.evict_expired(period, now)
    }

    /// Re-check `period` under the write lock, evicting it if still expired.
    ///
    /// A concurrent put may have refreshed the entry since the read lock was
    /// released; that entry is served as a hit.
    fn evict_expired(&self, period: &str, now: Instant) -> Option<Arc<BurnReport>> {
        let mut entries = self.entries.write();
        match entries.get(period) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                trace!(period, "Report refreshed concurrently, cache hit");
                record_cache_hit();
                return Some(Arc::clone(&entry.report));
            }
            Some(_) => {
                entries.remove(period);
                debug!(period, "Evicted expired report");
            }
            None => {}
        }
        record_cache_miss();
        None
    }

    fn put_at(&self, period: &str, report: Arc<BurnReport>, now: Instant) {
        self.entries.write().insert(
            period.to_string(),
            Entry {
                report,
                stored_at: now,
            },
        );
        debug!(period, "Report cached");
    }
}

impl Default for InMemoryReportCache {
    fn default() -> Self {
        Self::new(ReportCacheConfig::default())
    }
}

impl ReportCache for InMemoryReportCache {
    fn get(&self, period: &str) -> Option<Arc<BurnReport>> {
        self.get_at(period, Instant::now())
    }

    fn put(&self, period: &str, report: Arc<BurnReport>) {
        self.put_at(period, report, Instant::now());
    }

    fn invalidate(&self, period: &str) -> bool {
        let removed = self.entries.write().remove(period).is_some();
        if removed {
            debug!(period, "Report invalidated");
        }
        removed
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tacburn_core::config::BurnConfig;
    use tacburn_core::models::Period;
    use tacburn_core::ports::FetchResults;
    use tacburn_core::services::{ProcessingMode, build_report};

    fn report(label: &str) -> Arc<BurnReport> {
        let config = BurnConfig {
            restricted_validators: vec!["tacvaloper1a".into()],
            ..Default::default()
        };
        let period = Period::parse(label).unwrap();
        Arc::new(build_report(
            &config,
            &period,
            vec![],
            &FetchResults::default(),
            ProcessingMode::Lenient,
            Utc::now(),
        ))
    }

    fn cache(ttl_secs: u64) -> InMemoryReportCache {
        InMemoryReportCache::new(ReportCacheConfig {
            ttl: Duration::from_secs(ttl_secs),
        })
    }

    #[test]
    fn test_put_then_get() {
        let cache = cache(300);
        assert!(cache.get("2026-09").is_none());

        let stored = report("2026-09");
        cache.put("2026-09", Arc::clone(&stored));

        let hit = cache.get("2026-09").unwrap();
        assert!(Arc::ptr_eq(&hit, &stored));
        assert!(cache.get("2026-08").is_none());
    }

    #[test]
    fn test_expired_entry_is_miss_and_evicted() {
        let cache = cache(300);
        let t0 = Instant::now();
        cache.put_at("2026-09", report("2026-09"), t0);

        assert!(cache.get_at("2026-09", t0 + Duration::from_secs(299)).is_some());
        assert!(cache.get_at("2026-09", t0 + Duration::from_secs(300)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_keeps_concurrently_refreshed_entry() {
        let cache = cache(300);
        let t0 = Instant::now();
        let later = t0 + Duration::from_secs(400);

        // Another caller stored a fresh report between the read and write locks.
        let fresh = report("2026-09");
        cache.put_at("2026-09", Arc::clone(&fresh), later);

        let hit = cache.evict_expired("2026-09", later).unwrap();
        assert!(Arc::ptr_eq(&hit, &fresh));
        assert_eq!(cache.len(), 1);

        assert!(cache.evict_expired("2026-09", later + Duration::from_secs(300)).is_none());
        assert!(cache.is_empty());
        assert!(cache.evict_expired("2026-09", later).is_none());
    }

    #[test]
    fn test_put_replaces_and_refreshes() {
        let cache = cache(300);
        let t0 = Instant::now();
        cache.put_at("2026-09", report("2026-09"), t0);

        let newer = report("2026-09");
        cache.put_at("2026-09", Arc::clone(&newer), t0 + Duration::from_secs(200));

        let hit = cache
            .get_at("2026-09", t0 + Duration::from_secs(400))
            .unwrap();
        assert!(Arc::ptr_eq(&hit, &newer));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = cache(300);
        cache.put("2026-08", report("2026-08"));
        cache.put("2026-09", report("2026-09"));

        assert!(cache.invalidate("2026-08"));
        assert!(!cache.invalidate("2026-08"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
