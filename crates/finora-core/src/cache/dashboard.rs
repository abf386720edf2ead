use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::{DashboardSummary, PeriodKey};

/// Time-to-live for a cached summary.
pub const CACHE_TTL_MS: i64 = 60_000;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub summary: Arc<DashboardSummary>,
    pub period: PeriodKey,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(period: PeriodKey, summary: Arc<DashboardSummary>) -> Self {
        Self {
            summary,
            period,
            fetched_at: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    /// Valid iff fetched for `period` and younger than `ttl`.
    /// A negative age (clock moved backwards) counts as fresh.
    pub fn is_valid_for(&self, period: &PeriodKey, ttl: Duration) -> bool {
        self.period == *period && self.age() < ttl
    }
}

/// Single-slot dashboard cache. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct DashboardCache {
    slot: Mutex<Option<CacheEntry>>,
    ttl: Duration,
}

impl Default for DashboardCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::milliseconds(CACHE_TTL_MS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // The slot is only ever replaced wholesale, so a poisoned lock still
    // holds a consistent value.
    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached summary if it is still valid for `period`.
    pub fn get(&self, period: &PeriodKey) -> Option<Arc<DashboardSummary>> {
        let slot = self.lock();
        match slot.as_ref() {
            Some(entry) if entry.is_valid_for(period, self.ttl) => {
                debug!(period = %period, age_ms = entry.age().num_milliseconds(), "Dashboard cache hit");
                Some(Arc::clone(&entry.summary))
            }
            Some(entry) => {
                debug!(
                    period = %period,
                    cached_period = %entry.period,
                    age_ms = entry.age().num_milliseconds(),
                    "Dashboard cache miss"
                );
                None
            }
            None => {
                debug!(period = %period, "Dashboard cache empty");
                None
            }
        }
    }

    /// Replace the slot with a freshly fetched summary.
    pub fn store(&self, period: PeriodKey, summary: Arc<DashboardSummary>) {
        *self.lock() = Some(CacheEntry::new(period, summary));
    }

    pub fn invalidate(&self) {
        if self.lock().take().is_some() {
            debug!("Dashboard cache invalidated");
        }
    }

    /// Snapshot of the current entry, valid or not.
    pub fn entry(&self) -> Option<CacheEntry> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(year: i32, month: u32) -> Arc<DashboardSummary> {
        Arc::new(DashboardSummary {
            total_balance: 100.0,
            currency: "EUR".to_string(),
            year,
            month,
            monthly_income: 0.0,
            monthly_expenses: 0.0,
            monthly_savings: 0.0,
            expenses_by_category: vec![],
            monthly_trend: vec![],
        })
    }

    fn backdate(cache: &DashboardCache, by: Duration) {
        let mut slot = cache.lock();
        if let Some(entry) = slot.as_mut() {
            entry.fetched_at = Utc::now() - by;
        }
    }

    #[test]
    fn test_hit_returns_same_allocation() {
        let cache = DashboardCache::new();
        let period = PeriodKey::new(2024, 3);
        let stored = summary(2024, 3);
        cache.store(period, Arc::clone(&stored));

        let hit = cache.get(&period).expect("fresh entry should hit");
        assert!(Arc::ptr_eq(&hit, &stored));
    }

    #[test]
    fn test_other_period_misses() {
        let cache = DashboardCache::new();
        cache.store(PeriodKey::new(2024, 3), summary(2024, 3));
        assert!(cache.get(&PeriodKey::new(2024, 4)).is_none());
        assert!(cache.get(&PeriodKey::new(2023, 3)).is_none());
        // The entry itself is kept.
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = DashboardCache::new();
        let period = PeriodKey::new(2024, 3);
        cache.store(period, summary(2024, 3));

        backdate(&cache, Duration::milliseconds(CACHE_TTL_MS - 1_000));
        assert!(cache.get(&period).is_some());

        backdate(&cache, Duration::milliseconds(CACHE_TTL_MS));
        assert!(cache.get(&period).is_none());
    }

    #[test]
    fn test_invalidate_clears_slot() {
        let cache = DashboardCache::new();
        let period = PeriodKey::new(2024, 3);
        cache.store(period, summary(2024, 3));
        cache.invalidate();
        assert!(cache.is_empty());
        assert!(cache.get(&period).is_none());

        // Invalidating an empty cache is fine.
        cache.invalidate();
    }

    #[test]
    fn test_store_replaces_previous_entry() {
        let cache = DashboardCache::new();
        cache.store(PeriodKey::new(2024, 3), summary(2024, 3));
        cache.store(PeriodKey::new(2024, 4), summary(2024, 4));

        let entry = cache.entry().expect("entry present");
        assert_eq!(entry.period, PeriodKey::new(2024, 4));
        assert!(cache.get(&PeriodKey::new(2024, 3)).is_none());
    }

    #[test]
    fn test_clock_skew_counts_as_fresh() {
        let cache = DashboardCache::new();
        let period = PeriodKey::new(2024, 3);
        cache.store(period, summary(2024, 3));
        backdate(&cache, Duration::minutes(-5));
        assert!(cache.get(&period).is_some());
    }
}
