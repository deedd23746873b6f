//! # Constants
//!
//! Shared constants and environment variable names used throughout the suite.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Environment variable holding the GCP project identifier
pub const ENV_GCP_PROJECT_ID: &str = "GCP_PROJECT_ID";

/// Environment variable overriding the Secret Manager endpoint (used by tests
/// and mock servers)
pub const ENV_SECRET_MANAGER_ENDPOINT: &str = "GCP_SECRET_MANAGER_ENDPOINT";

/// Environment variable supplying a pre-issued OAuth2 access token, bypassing
/// the metadata server
pub const ENV_GCP_ACCESS_TOKEN: &str = "GCP_ACCESS_TOKEN";

/// Environment variable overriding the cache time-to-live in seconds
pub const ENV_CACHE_TTL_SECS: &str = "SECRET_CACHE_TTL_SECS";

/// Environment variable overriding the cache capacity bound
pub const ENV_CACHE_MAX_ENTRIES: &str = "SECRET_CACHE_MAX_ENTRIES";

/// Default Secret Manager REST API endpoint
pub const DEFAULT_SECRET_MANAGER_ENDPOINT: &str = "https://secretmanager.googleapis.com";

/// Default cache time-to-live (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default cache capacity bound (entries)
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 1000;

/// GCE metadata server endpoint for Workload Identity token retrieval
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Namespace prefix for derived cache keys, keeping secret entries apart from
/// cache keys owned by unrelated concerns
pub const CACHE_KEY_NAMESPACE: &str = "secrets";

/// Severity tag attached to failure reports, equivalent to HTTP 500
pub const SEVERITY_INTERNAL_ERROR: u16 = 500;
