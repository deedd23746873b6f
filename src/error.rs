//! # Error Types
//!
//! Typed errors for the secret suite.
//!
//! Provider failures carry their HTTP code and status string so callers can
//! classify them (`is_conflict`, `is_not_found`) instead of treating every
//! failure the same way. The enum is `Clone` because cache loaders surface
//! shared errors behind an `Arc`.

use thiserror::Error;

/// Error type for suite operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuiteError {
    /// Missing or invalid process configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// The named secret (or its latest version) does not exist in the provider
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The secret already exists; the caller should reconcile instead of create
    #[error("secret already exists: {0}")]
    Conflict(String),

    /// Any other provider-side failure, with the provider's own classification
    #[error("provider error: {message} (code: {code}, status: {status})")]
    Provider {
        /// HTTP status code reported by the provider
        code: u16,
        /// Provider status string (e.g. "PERMISSION_DENIED")
        status: String,
        /// Human-readable provider message
        message: String,
    },

    /// Transport-level failure before a provider response was obtained
    #[error("network error: {0}")]
    Network(String),

    /// Payload could not be serialized to its canonical encoding
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Provider returned a payload the suite cannot represent
    #[error("invalid secret payload: {0}")]
    InvalidPayload(String),

    /// The suite does not support the requested operation
    #[error("operation not supported by {provider} suite: {operation}")]
    Unsupported {
        /// Provider id of the suite
        provider: &'static str,
        /// Operation that was requested
        operation: &'static str,
    },
}

impl SuiteError {
    /// True for a genuine "already exists" conflict.
    ///
    /// Only this classification may take the fetch-compare-rotate branch on
    /// the write path; every other create failure is surfaced distinctly.
    pub fn is_conflict(&self) -> bool {
        match self {
            SuiteError::Conflict(_) => true,
            SuiteError::Provider { code, status, .. } => {
                *code == 409 || status == "ALREADY_EXISTS"
            }
            _ => false,
        }
    }

    /// True when the provider reported the secret (or version) as absent
    pub fn is_not_found(&self) -> bool {
        match self {
            SuiteError::NotFound(_) => true,
            SuiteError::Provider { code, status, .. } => *code == 404 || status == "NOT_FOUND",
            _ => false,
        }
    }

    /// Numeric code attached to failure reports
    pub fn report_code(&self) -> u16 {
        match self {
            SuiteError::NotFound(_) => 404,
            SuiteError::Conflict(_) => 409,
            SuiteError::Provider { code, .. } => *code,
            SuiteError::Network(_) => 502,
            SuiteError::Config(_)
            | SuiteError::Serialization(_)
            | SuiteError::InvalidPayload(_)
            | SuiteError::Unsupported { .. } => 500,
        }
    }
}

impl From<reqwest::Error> for SuiteError {
    fn from(err: reqwest::Error) -> Self {
        SuiteError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SuiteError {
    fn from(err: serde_json::Error) -> Self {
        SuiteError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_classification_requires_409_or_already_exists() {
        assert!(SuiteError::Conflict("db-password".into()).is_conflict());
        assert!(SuiteError::Provider {
            code: 409,
            status: "ABORTED".into(),
            message: "conflict".into(),
        }
        .is_conflict());
        assert!(SuiteError::Provider {
            code: 400,
            status: "ALREADY_EXISTS".into(),
            message: "duplicate".into(),
        }
        .is_conflict());

        // Permission failures must not be mistaken for "already provisioned"
        assert!(!SuiteError::Provider {
            code: 403,
            status: "PERMISSION_DENIED".into(),
            message: "denied".into(),
        }
        .is_conflict());
        assert!(!SuiteError::Network("connection refused".into()).is_conflict());
    }

    #[test]
    fn not_found_classification() {
        assert!(SuiteError::NotFound("db-password".into()).is_not_found());
        assert!(SuiteError::Provider {
            code: 404,
            status: "NOT_FOUND".into(),
            message: "missing".into(),
        }
        .is_not_found());
        assert!(!SuiteError::Conflict("db-password".into()).is_not_found());
    }

    #[test]
    fn report_codes_default_to_internal_error() {
        assert_eq!(SuiteError::Config("missing project".into()).report_code(), 500);
        assert_eq!(SuiteError::NotFound("x".into()).report_code(), 404);
        assert_eq!(
            SuiteError::Provider {
                code: 403,
                status: "PERMISSION_DENIED".into(),
                message: "denied".into(),
            }
            .report_code(),
            403
        );
    }
}
