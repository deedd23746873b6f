//! # Failure Reports
//!
//! Structured failure records emitted to the process log sink.
//!
//! Every swallowed-or-surfaced provider failure produces exactly one record
//! with a human message, a numeric code, a detail payload, and an internal
//! error severity tag. Emission is fire-and-forget; the record is a side
//! channel, never the only failure signal.

use crate::constants::SEVERITY_INTERNAL_ERROR;
use crate::error::SuiteError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

/// One structured failure record
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    /// Human-readable failure message
    pub message: String,
    /// Numeric code derived from the failure classification
    pub code: u16,
    /// Severity classification, equivalent to HTTP 500
    pub severity: u16,
    /// Detail payload (debug rendering of the underlying failure)
    pub detail: String,
    /// Provider id of the suite that failed
    pub provider: &'static str,
    /// Operation that failed ("get" or "create")
    pub operation: &'static str,
    /// Name of the secret involved; never its value
    pub secret_name: String,
    /// Time the record was built
    pub timestamp: DateTime<Utc>,
}

impl FailureReport {
    /// Build a record from a suite error
    pub fn from_error(
        provider: &'static str,
        operation: &'static str,
        secret_name: &str,
        err: &SuiteError,
    ) -> Self {
        Self {
            message: err.to_string(),
            code: err.report_code(),
            severity: SEVERITY_INTERNAL_ERROR,
            detail: format!("{err:?}"),
            provider,
            operation,
            secret_name: secret_name.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Emit the record to the log sink as a single structured event
    pub fn emit(&self) {
        let payload = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        error!(
            target: "secret_manager_suite::failure",
            provider = self.provider,
            operation = self.operation,
            secret.name = %self.secret_name,
            code = self.code,
            severity = self.severity,
            payload = %payload,
            "secret operation failed: {}",
            self.message
        );
    }
}
