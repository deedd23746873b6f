//! # GCP Secret Manager Clients
//!
//! The provider boundary for the GCP suite. All network, auth, and wire
//! protocol work lives behind [`SecretManagerClient`]; the suite itself only
//! sequences calls and manages the cache.

use crate::error::SuiteError;
use async_trait::async_trait;

pub mod common;
pub mod rest;

pub use rest::SecretManagerRest;

/// Opaque provider capability performing Secret Manager operations.
///
/// One long-lived instance is shared by the suite so connection and
/// credential setup are amortized across calls.
#[async_trait]
pub trait SecretManagerClient: Send + Sync {
    /// Create the secret resource (no versions yet) with automatic
    /// replication.
    ///
    /// # Errors
    /// Returns `SuiteError::Conflict` when the secret already exists; other
    /// failures keep their own classification.
    async fn create_secret(&self, secret_name: &str) -> Result<(), SuiteError>;

    /// Add a new enabled version holding `data`.
    ///
    /// # Errors
    /// Returns an error if the secret does not exist or the call fails.
    async fn add_secret_version(&self, secret_name: &str, data: &str) -> Result<(), SuiteError>;

    /// Fetch the payload of the latest enabled version.
    ///
    /// # Errors
    /// Returns `SuiteError::NotFound` when the secret or version is absent.
    async fn access_latest(&self, secret_name: &str) -> Result<String, SuiteError>;

    /// Fetch secret metadata, verifying the resource exists.
    ///
    /// # Errors
    /// Returns `SuiteError::NotFound` when the secret is absent.
    async fn get_secret(&self, secret_name: &str) -> Result<(), SuiteError>;

    /// Disable every currently enabled version, returning how many were
    /// disabled.
    ///
    /// # Errors
    /// Returns an error if listing or disabling fails partway; versions
    /// already disabled stay disabled.
    async fn disable_enabled_versions(&self, secret_name: &str) -> Result<usize, SuiteError>;
}
