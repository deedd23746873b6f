//! # GCP Suite
//!
//! Concrete cloud suite backed by Google Cloud Secret Manager.
//!
//! Read path: atomic cache get-or-compute, then one provider fetch of the
//! latest version. Write path: attempt creation, and on a genuine
//! "already exists" conflict reconcile the existing secret: compare the
//! latest value byte-for-byte and rotate (disable all enabled versions, add
//! a new one) only when it differs. The cache entry is refreshed after every
//! successful write, so cache and provider cannot diverge for longer than
//! one write.
//!
//! Concurrency: reads are single-flight per cache key (one in-flight fetch,
//! waiters share its result); writes are single-flight per secret name, so
//! concurrent creators cannot double-provision or double-rotate.

use crate::cache::SecretCache;
use crate::config::SuiteConfig;
use crate::error::SuiteError;
use crate::observability::metrics;
use crate::observability::report::FailureReport;
use crate::suite::{SecretValue, Suite, WriteOutcome};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

pub mod client;

use client::SecretManagerClient;

const PROVIDER: &str = "gcp";

/// Suite backed by Google Cloud Secret Manager
pub struct GcpSuite {
    client: Arc<dyn SecretManagerClient>,
    cache: SecretCache,
    // One async lock per secret name; entries are pruned once their writers
    // finish, so the map tracks in-flight writes only.
    create_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl std::fmt::Debug for GcpSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpSuite")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl GcpSuite {
    /// Build a suite from an existing provider client and cache.
    ///
    /// The client is shared and long-lived; connection and credential setup
    /// happen once, not per operation.
    pub fn new(client: Arc<dyn SecretManagerClient>, cache: SecretCache) -> Self {
        Self {
            client,
            cache,
            create_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Build a suite from process configuration, with a REST client and a
    /// cache sized from the config.
    ///
    /// # Errors
    /// Returns an error if configuration is missing or the client cannot
    /// authenticate.
    pub async fn from_env() -> Result<Self, SuiteError> {
        let config = SuiteConfig::from_env()?;
        let client = client::SecretManagerRest::new(&config).await?;
        let cache = SecretCache::new(config.cache_ttl, config.cache_max_entries);
        Ok(Self::new(Arc::new(client), cache))
    }

    fn create_lock(&self, secret_name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .create_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(
            locks
                .entry(secret_name.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    fn prune_write_lock(&self, secret_name: &str) {
        let mut locks = self
            .create_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Lock handles are only cloned under this mutex, so a strong count
        // of 1 means no writer holds or waits on the entry.
        if locks
            .get(secret_name)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(secret_name);
        }
    }

    /// Number of per-name write locks currently retained.
    ///
    /// Entries are pruned as writers finish, so this counts in-flight writes
    /// rather than every name ever written.
    pub fn write_lock_count(&self) -> usize {
        self.create_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    async fn get_secret_data_impl(&self, secret_name: &str) -> Result<Option<String>, SuiteError> {
        let key = self.cache_key(secret_name);
        let fetched = AtomicBool::new(false);

        let result = self
            .cache
            .get_or_try_fetch(key, async {
                fetched.store(true, Ordering::SeqCst);
                debug!("cache miss, fetching latest version of {}", secret_name);
                self.client.access_latest(secret_name).await
            })
            .await;

        if fetched.load(Ordering::SeqCst) {
            metrics::record_cache_miss(PROVIDER);
        } else {
            metrics::record_cache_hit(PROVIDER);
        }

        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_secret_impl(
        &self,
        secret_name: &str,
        data: &str,
    ) -> Result<WriteOutcome, SuiteError> {
        match self.client.create_secret(secret_name).await {
            Ok(()) => {
                self.client.add_secret_version(secret_name, data).await?;
                info!("Created GCP secret {} with initial version", secret_name);
                Ok(WriteOutcome::Created)
            }
            Err(e) if e.is_conflict() => self.reconcile_existing(secret_name, data).await,
            Err(e) => Err(e),
        }
    }

    /// Reconcile an already-provisioned secret with the desired value
    async fn reconcile_existing(
        &self,
        secret_name: &str,
        data: &str,
    ) -> Result<WriteOutcome, SuiteError> {
        self.client.get_secret(secret_name).await?;
        let current = match self.client.access_latest(secret_name).await {
            Ok(current) => current,
            // A previous writer created the resource but never added a
            // version; the first add repairs it.
            Err(e) if e.is_not_found() => {
                info!("GCP secret {} has no readable version, adding one", secret_name);
                self.client.add_secret_version(secret_name, data).await?;
                return Ok(WriteOutcome::Created);
            }
            Err(e) => return Err(e),
        };
        if current == data {
            debug!("GCP secret {} unchanged, skipping rotation", secret_name);
            return Ok(WriteOutcome::Unchanged);
        }

        info!("Secret value changed, rotating GCP secret: {}", secret_name);
        self.client.disable_enabled_versions(secret_name).await?;
        self.client.add_secret_version(secret_name, data).await?;
        Ok(WriteOutcome::Rotated)
    }
}

#[async_trait]
impl Suite for GcpSuite {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn is_cloud(&self) -> bool {
        true
    }

    async fn get_secret_data(&self, secret_name: &str) -> Result<Option<String>, SuiteError> {
        if secret_name.is_empty() {
            return Ok(None);
        }

        match self.get_secret_data_impl(secret_name).await {
            Ok(value) => Ok(value),
            Err(e) => {
                FailureReport::from_error(PROVIDER, "get", secret_name, &e).emit();
                Err(e)
            }
        }
    }

    async fn create_secret(
        &self,
        secret_name: &str,
        value: SecretValue,
    ) -> Result<WriteOutcome, SuiteError> {
        if secret_name.is_empty() {
            return Ok(WriteOutcome::Skipped);
        }

        let start = Instant::now();
        let result = async {
            let data = value.canonical()?;

            // One in-flight create/rotate per secret name
            let lock = self.create_lock(secret_name);
            let _guard = lock.lock().await;

            let outcome = self.create_secret_impl(secret_name, &data).await?;

            // Keep the cache aligned with what the provider now holds
            self.cache.set(self.cache_key(secret_name), data).await;
            Ok(outcome)
        }
        .await;
        self.prune_write_lock(secret_name);

        match result {
            Ok(outcome) => {
                metrics::record_secret_operation(
                    PROVIDER,
                    outcome.as_str(),
                    start.elapsed().as_secs_f64(),
                );
                Ok(outcome)
            }
            Err(e) => {
                FailureReport::from_error(PROVIDER, "create", secret_name, &e).emit();
                metrics::increment_provider_operation_errors(PROVIDER);
                Err(e)
            }
        }
    }
}
