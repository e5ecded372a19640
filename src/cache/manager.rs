//! Cache Manager Module
//!
//! Foundational get/set/invalidate API over the entry store, applying
//! TTL policy on every read. One instance is constructed at process
//! start and shared as `Arc<CacheManager>` by every call site; nothing
//! else mutates the store.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde_json::Value;

use crate::cache::read_through::FlightTable;
use crate::cache::{CacheEntry, CacheStats, EntryStore, MetricsTracker, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

// == Cache Manager ==
/// Shared in-process cache with TTL expiry and prefix invalidation.
///
/// All methods here are synchronous and never suspend; the store lock is
/// only held across short critical sections with no awaits inside.
#[derive(Debug, Default)]
pub struct CacheManager {
    /// Key-to-entry storage
    store: RwLock<EntryStore>,
    /// Hit/miss/eviction counters
    metrics: MetricsTracker,
    /// In-flight producer calls keyed by cache key
    pub(crate) flights: FlightTable,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a new empty CacheManager.
    pub fn new() -> Self {
        Self {
            store: RwLock::new(EntryStore::new()),
            metrics: MetricsTracker::new(),
            flights: FlightTable::new(),
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value only if an entry exists and its TTL has not
    /// elapsed. A stale entry is removed as a side effect (lazy eviction)
    /// and reported as a miss. Absence is a normal outcome, not an error.
    pub fn get(&self, key: &str) -> Option<Value> {
        {
            let store = self.read_store();
            match store.entry(key) {
                Some(entry) if !entry.is_expired() => {
                    let value = entry.value.clone();
                    self.metrics.record_hit();
                    return Some(value);
                }
                Some(_) => {} // expired, fall through to evict
                None => {
                    self.metrics.record_miss();
                    return None;
                }
            }
        }

        // Expired entry: re-check under the write lock, a concurrent set
        // may have refreshed the key since the read lock was released.
        let mut store = self.write_store();
        match store.entry(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                self.metrics.record_hit();
                Some(value)
            }
            Some(_) => {
                store.remove(key);
                self.metrics.record_evictions(1);
                self.metrics.record_miss();
                None
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair, fully replacing any previous entry for
    /// the key (value, write time, and TTL).
    ///
    /// A TTL of `None` or zero means the entry never expires and must be
    /// removed explicitly.
    ///
    /// # Errors
    /// Fails fast on a key that violates the key contract.
    pub fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        validate_key(key)?;

        let entry = CacheEntry::new(value, ttl);
        self.write_store().insert(key.to_string(), entry);

        Ok(())
    }

    // == Invalidate ==
    /// Removes the entry for a key if present.
    ///
    /// Returns true if an entry was removed; absence is a no-op, not an
    /// error.
    pub fn invalidate(&self, key: &str) -> bool {
        self.write_store().remove(key)
    }

    // == Invalidate Category ==
    /// Removes every entry whose key starts with the given prefix and
    /// returns the number removed.
    ///
    /// Categories are a key-naming convention (`"product:details:42"`),
    /// so this is a full key scan. Matching zero entries returns 0.
    ///
    /// # Errors
    /// An empty prefix is rejected: it would match every key, and
    /// [`clear`](Self::clear) exists for that.
    pub fn invalidate_category(&self, prefix: &str) -> Result<usize> {
        if prefix.is_empty() {
            return Err(CacheError::InvalidKey(
                "Category prefix cannot be empty".to_string(),
            ));
        }

        Ok(self.write_store().remove_prefix(prefix))
    }

    // == Clear ==
    /// Removes all entries. Returns the number removed.
    pub fn clear(&self) -> usize {
        self.write_store().clear()
    }

    // == Purge Expired ==
    /// Proactively removes all currently-expired entries.
    ///
    /// Lazy eviction on read already keeps stale entries invisible; this
    /// bounds the memory held by keys that are never read again. Called
    /// by the background sweep task.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let removed = self.write_store().purge_expired();
        self.metrics.record_evictions(removed as u64);
        removed
    }

    // == Stats ==
    /// Returns a point-in-time snapshot of entry count and counters.
    /// Does not mutate any state.
    pub fn stats(&self) -> CacheStats {
        let entries = self.read_store().len();
        self.metrics.snapshot(entries)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.read_store().len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.read_store().is_empty()
    }

    // == Lock Helpers ==
    // A poisoned lock only means a panic happened mid-operation elsewhere;
    // the map itself is still structurally sound, so recover the guard.
    fn read_store(&self) -> RwLockReadGuard<'_, EntryStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, EntryStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Key Validation ==
/// Checks a key against the key contract: non-empty and within the
/// length limit. Violations are programming errors at the call site and
/// fail fast.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
