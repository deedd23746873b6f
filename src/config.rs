//! # Configuration
//!
//! Process configuration for the suite, collected once from the environment.
//!
//! `GCP_PROJECT_ID` is required for every provider call; it is validated here
//! instead of surfacing later as an opaque provider-level failure.

use crate::constants::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECS, DEFAULT_SECRET_MANAGER_ENDPOINT,
    ENV_CACHE_MAX_ENTRIES, ENV_CACHE_TTL_SECS, ENV_GCP_PROJECT_ID, ENV_SECRET_MANAGER_ENDPOINT,
};
use crate::error::SuiteError;
use std::time::Duration;

/// Configuration for a cloud suite and its cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// GCP project the secrets live under
    pub project_id: String,
    /// Secret Manager endpoint; overridable for tests and mock servers
    pub endpoint: String,
    /// Cache entry time-to-live
    pub cache_ttl: Duration,
    /// Cache capacity bound
    pub cache_max_entries: u64,
}

impl SuiteConfig {
    /// Build a configuration with defaults for everything but the project id
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            endpoint: DEFAULT_SECRET_MANAGER_ENDPOINT.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }

    /// Override the Secret Manager endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the cache time-to-live
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Override the cache capacity bound
    #[must_use]
    pub fn with_cache_max_entries(mut self, max_entries: u64) -> Self {
        self.cache_max_entries = max_entries;
        self
    }

    /// Read configuration from process environment variables.
    ///
    /// # Errors
    /// Returns `SuiteError::Config` when `GCP_PROJECT_ID` is missing or empty,
    /// or when a numeric override does not parse.
    pub fn from_env() -> Result<Self, SuiteError> {
        let project_id = std::env::var(ENV_GCP_PROJECT_ID)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                SuiteError::Config(format!("{ENV_GCP_PROJECT_ID} is not set"))
            })?;

        let endpoint = std::env::var(ENV_SECRET_MANAGER_ENDPOINT)
            .unwrap_or_else(|_| DEFAULT_SECRET_MANAGER_ENDPOINT.to_string());

        let cache_ttl = Duration::from_secs(parse_env_u64(
            ENV_CACHE_TTL_SECS,
            DEFAULT_CACHE_TTL_SECS,
        )?);
        let cache_max_entries =
            parse_env_u64(ENV_CACHE_MAX_ENTRIES, DEFAULT_CACHE_MAX_ENTRIES)?;

        Ok(Self {
            project_id,
            endpoint,
            cache_ttl,
            cache_max_entries,
        })
    }
}

fn parse_env_u64(var: &str, default: u64) -> Result<u64, SuiteError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| SuiteError::Config(format!("{var} is not a valid integer: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = SuiteConfig::new("my-project");
        assert_eq!(config.project_id, "my-project");
        assert_eq!(config.endpoint, DEFAULT_SECRET_MANAGER_ENDPOINT);
        assert_eq!(config.cache_ttl, Duration::from_secs(DEFAULT_CACHE_TTL_SECS));
        assert_eq!(config.cache_max_entries, DEFAULT_CACHE_MAX_ENTRIES);
    }

    #[test]
    fn builder_overrides() {
        let config = SuiteConfig::new("my-project")
            .with_endpoint("http://127.0.0.1:9090")
            .with_cache_ttl(Duration::from_secs(5))
            .with_cache_max_entries(10);
        assert_eq!(config.endpoint, "http://127.0.0.1:9090");
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.cache_max_entries, 10);
    }

    #[test]
    fn parse_env_u64_rejects_garbage() {
        // Unique variable name so parallel tests cannot collide
        std::env::set_var("SUITE_TEST_PARSE_ENV_U64", "not-a-number");
        let result = parse_env_u64("SUITE_TEST_PARSE_ENV_U64", 7);
        assert!(matches!(result, Err(SuiteError::Config(_))));
        std::env::remove_var("SUITE_TEST_PARSE_ENV_U64");
        assert_eq!(parse_env_u64("SUITE_TEST_PARSE_ENV_U64", 7).unwrap(), 7);
    }
}
