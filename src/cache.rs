//! # Secret Cache
//!
//! In-process cache for fetched secret payloads, backed by `moka`.
//!
//! TTL and eviction are owned here; the suites only derive keys and decide
//! when to refresh entries. `get_or_try_fetch` is the atomic get-or-compute
//! used by the read path: concurrent callers missing on the same key share a
//! single in-flight fetch instead of racing check-then-act.

use crate::error::SuiteError;
use moka::future::Cache;
use std::future::Future;
use std::time::Duration;

/// Cache of secret payloads keyed by derived cache keys
pub struct SecretCache {
    cache: Cache<String, String>,
    ttl: Duration,
}

impl std::fmt::Debug for SecretCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCache")
            .field("ttl", &self.ttl)
            .field("entry_count", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl SecretCache {
    /// Create a cache with the given entry time-to-live and capacity bound
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { cache, ttl }
    }

    /// Membership test for a derived cache key
    pub fn has(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Get a cached payload
    pub async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await
    }

    /// Store a payload under a derived cache key
    pub async fn set(&self, key: String, value: String) {
        self.cache.insert(key, value).await;
    }

    /// Drop a cached payload
    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Return the cached payload for `key`, or run `fetch` to resolve it.
    ///
    /// Only one fetch per key is in flight at a time; other callers wait on
    /// its result. Failed fetches are not cached, so a later call retries.
    ///
    /// # Errors
    /// Propagates the fetch error to every waiting caller.
    pub async fn get_or_try_fetch<Fut>(&self, key: String, fetch: Fut) -> Result<String, SuiteError>
    where
        Fut: Future<Output = Result<String, SuiteError>>,
    {
        self.cache
            .try_get_with(key, fetch)
            .await
            .map_err(|shared| shared.as_ref().clone())
    }

    /// Entry time-to-live this cache was built with
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
