//! Cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for a cache.
///
/// All counters are atomic and can be safely updated from multiple threads.
#[derive(Debug, Default)]
pub(crate) struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    failed_loads: AtomicU64,
    sets: AtomicU64,
    clears: AtomicU64,
}

impl CacheStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished loader run.
    #[inline]
    pub(crate) fn record_load(&self, ok: bool) {
        if ok {
            self.loads.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_loads.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, size: usize) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            failed_loads: self.failed_loads.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a cache's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    /// Stored entries at the time of the snapshot
    pub size: usize,
    /// Lookups served from a stored value
    pub hits: u64,
    /// Lookups that found nothing stored
    pub misses: u64,
    /// Successful loader runs
    pub loads: u64,
    /// Loader runs that returned an error
    pub failed_loads: u64,
    /// Explicit writes
    pub sets: u64,
    /// Clear calls
    pub clears: u64,
}

impl CacheStatsSnapshot {
    /// Hits divided by total lookups, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn total_lookups(&self) -> u64 {
        self.hits + self.misses
    }
}
