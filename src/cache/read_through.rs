//! Read-Through Module
//!
//! `cached` wraps an arbitrary producer (typically a database query)
//! behind the cache: hits return immediately, misses run the producer
//! once and store the result. Concurrent misses for the same key are
//! coalesced onto a single in-flight producer call, so a popular key
//! going stale never stampedes the data source.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::cache::manager::{validate_key, CacheManager};
use crate::error::{CacheError, Result};

// == Key Composition ==
/// Composes a cache key from a category and a discriminator.
///
/// Category membership is this naming convention: every key for a data
/// domain shares the `"category:"` prefix that `invalidate_category`
/// matches on.
pub fn cache_key(category: &str, discriminator: impl Display) -> String {
    format!("{category}:{discriminator}")
}

// == Flight Table ==
/// Side table of in-flight producer calls, keyed by cache key.
///
/// Each flight is a shared cell: the first caller to reach an
/// uninitialized cell runs the producer, every later caller awaits the
/// same cell. The entry is removed once the flight settles, so a later
/// miss starts a fresh flight.
#[derive(Debug, Default)]
pub(crate) struct FlightTable {
    flights: Mutex<HashMap<String, Arc<OnceCell<Value>>>>,
}

impl FlightTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the shared cell for a key, creating one if no flight is
    /// currently active.
    async fn join(&self, key: &str) -> Arc<OnceCell<Value>> {
        let mut flights = self.flights.lock().await;
        flights
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Removes the flight entry for a key once its cell has settled.
    ///
    /// Guarded by pointer identity: a later flight under the same key
    /// must not be torn down by a straggler from an earlier one.
    async fn settle(&self, key: &str, cell: &Arc<OnceCell<Value>>) {
        let mut flights = self.flights.lock().await;
        if let Some(active) = flights.get(key) {
            if Arc::ptr_eq(active, cell) {
                flights.remove(key);
            }
        }
    }
}

// == Read-Through API ==
impl CacheManager {
    /// Returns the cached value for `key`, or computes it via `producer`.
    ///
    /// 1. On a valid cached entry, returns it without invoking the
    ///    producer.
    /// 2. On a miss, invokes the producer, stores the result under `key`
    ///    with the given TTL, and returns it.
    /// 3. A producer failure is propagated to the caller and nothing is
    ///    cached for the key, so a transient downstream outage is never
    ///    frozen in for the TTL duration.
    ///
    /// Concurrent callers missing on the same key while a producer call
    /// is in flight await that call's result instead of re-invoking the
    /// producer. The cache imposes no timeout of its own; a hung producer
    /// blocks only the callers awaiting that key.
    ///
    /// # Arguments
    /// * `key` - Cache key, typically composed via [`cache_key`]
    /// * `ttl` - Time-to-live; `None` or zero means no expiry
    /// * `producer` - Fallback computation, awaited at most once per flight
    pub async fn cached<T, F, Fut>(&self, key: &str, ttl: Option<Duration>, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        validate_key(key)?;

        if let Some(value) = self.get(key) {
            return Ok(serde_json::from_value(value)?);
        }

        let cell = self.flights.join(key).await;
        let result = cell
            .get_or_try_init(|| async {
                debug!(key, "cache miss, invoking producer");
                let produced = producer().await.map_err(CacheError::Producer)?;
                let value = serde_json::to_value(&produced)?;
                self.set(key, value.clone(), ttl)?;
                Ok::<Value, CacheError>(value)
            })
            .await
            .map(Value::clone);
        self.flights.settle(key, &cell).await;

        Ok(serde_json::from_value(result?)?)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::assert_ok;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        id: u64,
        title: String,
    }

    fn product(id: u64) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
        }
    }

    #[test]
    fn test_cache_key_composition() {
        assert_eq!(cache_key("product:details", 42), "product:details:42");
        assert_eq!(cache_key("user", "abc"), "user:abc");
    }

    #[tokio::test]
    async fn test_miss_then_hit_invokes_producer_once() {
        let cache = CacheManager::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Product = cache
                .cached("product:details:1", Some(Duration::from_secs(5)), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(product(1))
                })
                .await
                .unwrap();
            assert_eq!(value, product(1));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hit_skips_producer_entirely() {
        let cache = CacheManager::new();
        cache
            .set("product:details:1", serde_json::to_value(product(1)).unwrap(), None)
            .unwrap();

        let calls = AtomicUsize::new(0);
        let value: Product = cache
            .cached("product:details:1", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(product(99))
            })
            .await
            .unwrap();

        assert_eq!(value, product(1), "hit must return the cached value");
        assert_eq!(calls.load(Ordering::SeqCst), 0, "producer must not run on a hit");
    }

    #[tokio::test]
    async fn test_producer_failure_propagates_and_is_not_cached() {
        let cache = CacheManager::new();
        let calls = AtomicUsize::new(0);

        let first: Result<Product> = cache
            .cached("product:details:7", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow!("database unreachable"))
            })
            .await;
        assert!(matches!(first, Err(CacheError::Producer(_))));
        assert_eq!(cache.len(), 0);

        // The failure was not cached; the next call runs the producer again
        let second = cache
            .cached("product:details:7", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(product(7))
            })
            .await;
        assert_ok!(&second);
        assert_eq!(second.unwrap(), product(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_coalesce_to_one_producer_call() {
        let cache = Arc::new(CacheManager::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .cached("product:details:3", Some(Duration::from_secs(5)), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        // Hold the flight open long enough for every task to join it
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(product(3))
                    })
                    .await
            }));
        }

        for handle in handles {
            let value = handle.await.unwrap().unwrap();
            assert_eq!(value, product(3));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_flight_table_clears_after_settle() {
        let cache = CacheManager::new();

        let _: Product = cache
            .cached("product:details:9", None, || async { Ok(product(9)) })
            .await
            .unwrap();

        let flights = cache.flights.flights.lock().await;
        assert!(flights.is_empty(), "settled flight should be removed");
    }

    #[tokio::test]
    async fn test_expired_entry_reinvokes_producer() {
        let cache = CacheManager::new();
        let calls = AtomicUsize::new(0);

        let produce = |calls: &AtomicUsize| {
            calls.fetch_add(1, Ordering::SeqCst);
            product(5)
        };

        let _: Product = cache
            .cached("product:details:5", Some(Duration::from_millis(30)), || async {
                Ok(produce(&calls))
            })
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        let _: Product = cache
            .cached("product:details:5", Some(Duration::from_millis(30)), || async {
                Ok(produce(&calls))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cached_rejects_invalid_key() {
        let cache = CacheManager::new();

        let result: Result<Product> = cache.cached("", None, || async { Ok(product(1)) }).await;
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }
}
