//! Batch Bundler Module
//!
//! Groups independent identifier-keyed lookups into one bulk fetch
//! cached as a single composite entry, replacing the one-query-per-id
//! pattern on list-rendering paths. The id set is canonicalized so the
//! same logical set always lands on the same cache key.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::manager::CacheManager;
use crate::error::Result;

// == Bundle Key ==
/// Composes the composite cache key for a canonical id set.
///
/// Ids must already be sorted and deduplicated; two requests for the
/// same logical set then produce an identical key regardless of input
/// ordering.
pub fn bundle_key(category: &str, ids: &[u64]) -> String {
    let joined = ids
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{category}:bundle:{joined}")
}

/// Sorts and deduplicates the requested ids.
fn canonical_ids(ids: &[u64]) -> Vec<u64> {
    let mut canonical = ids.to_vec();
    canonical.sort_unstable();
    canonical.dedup();
    canonical
}

// == Batch API ==
impl CacheManager {
    /// Fetches values for a set of ids through one bulk producer call,
    /// cached as a single composite entry.
    ///
    /// The canonical id set (sorted, deduplicated) forms the cache key,
    /// so `get_many("product", &[3, 1, 2], ..)` and
    /// `get_many("product", &[1, 2, 3], ..)` share one entry and one
    /// fetch. The trade-off is coarse granularity: any change to the
    /// requested set is a fresh key, hence a fresh miss for the whole
    /// batch.
    ///
    /// `fetch` receives the canonical ids and returns the bulk result
    /// keyed by id (ids missing from the data source are simply absent
    /// from the map). An empty id set returns an empty map without
    /// invoking `fetch` or touching the store.
    pub async fn get_many<T, F, Fut>(
        &self,
        category: &str,
        ids: &[u64],
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<HashMap<u64, T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Vec<u64>) -> Fut,
        Fut: Future<Output = anyhow::Result<HashMap<u64, T>>>,
    {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let canonical = canonical_ids(ids);
        let key = bundle_key(category, &canonical);

        self.cached(&key, ttl, move || fetch(canonical)).await
    }
}
