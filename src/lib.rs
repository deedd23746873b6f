//! # Secret Manager Suite
//!
//! Provider-agnostic secret access behind a uniform [`Suite`] contract, with
//! an in-process cache to avoid repeated network round-trips.
//!
//! The crate ships two suites:
//! - [`GcpSuite`]: cloud suite backed by Google Cloud Secret Manager via a
//!   long-lived REST client
//! - [`EnvSuite`]: non-cloud suite reading process environment variables
//!
//! Reads consult the cache first and fall through to the provider on a miss;
//! writes create the secret or rotate its value when it differs, then
//! refresh the cache. Results are discriminated: callers can tell an absent
//! secret (`Ok(None)`) from a failed fetch (`Err`), and every failure also
//! emits one structured record to the log sink.
//!
//! ```no_run
//! use secret_manager_suite::{GcpSuite, SecretValue, Suite};
//!
//! # async fn demo() -> Result<(), secret_manager_suite::SuiteError> {
//! let suite = GcpSuite::from_env().await?;
//! suite.create_secret("db-password", SecretValue::from("hunter2")).await?;
//! let value = suite.get_secret_data("db-password").await?;
//! assert_eq!(value.as_deref(), Some("hunter2"));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod suite;

pub use cache::SecretCache;
pub use config::SuiteConfig;
pub use error::SuiteError;
pub use observability::FailureReport;
pub use suite::env::EnvSuite;
pub use suite::gcp::client::{SecretManagerClient, SecretManagerRest};
pub use suite::gcp::GcpSuite;
pub use suite::{SecretValue, Suite, WriteOutcome};
