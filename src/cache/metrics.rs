//! Cache Metrics Module
//!
//! Tracks cache performance counters including hits, misses, and
//! TTL evictions, and derives the reported load-reduction estimate.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Upper bound on the reported load-reduction estimate. Even a cache with
/// a perfect hit rate still pays for the initial misses, so the estimate
/// is capped rather than reported as total elimination.
const LOAD_REDUCTION_CAP: f64 = 0.95;

// == Metrics Tracker ==
/// Live counters observed by the cache manager.
///
/// Counters are atomic so they can be recorded through a shared reference
/// without taking the store lock. Purely additive; nothing reads these
/// values to make caching decisions.
#[derive(Debug, Default)]
pub struct MetricsTracker {
    /// Number of reads served from a valid entry
    hits: AtomicU64,
    /// Number of reads that found no valid entry
    misses: AtomicU64,
    /// Number of entries removed because their TTL elapsed
    evictions: AtomicU64,
}

impl MetricsTracker {
    // == Constructor ==
    /// Creates a new MetricsTracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Evictions ==
    /// Adds to the eviction counter (lazy eviction on read and sweep runs).
    pub fn record_evictions(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Returns a point-in-time snapshot combined with the current entry
    /// count. Does not mutate any counter.
    pub fn snapshot(&self, entries: usize) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        CacheStats::new(entries, hits, misses, self.evictions.load(Ordering::Relaxed))
    }
}

// == Cache Stats ==
/// Point-in-time cache statistics snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Current number of entries in the cache
    pub entries: usize,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries removed by TTL expiry
    pub evictions: u64,
    /// hits / (hits + misses), 0 when no reads have been observed
    pub hit_rate: f64,
    /// Advisory estimate of the fraction of reads served without touching
    /// the underlying data source; hit rate capped, not a guarantee
    pub estimated_load_reduction: f64,
}

impl CacheStats {
    /// Builds a snapshot, deriving hit rate and the load-reduction estimate.
    pub fn new(entries: usize, hits: u64, misses: u64, evictions: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };

        Self {
            entries,
            hits,
            misses,
            evictions,
            hit_rate,
            estimated_load_reduction: hit_rate.min(LOAD_REDUCTION_CAP),
        }
    }
}
