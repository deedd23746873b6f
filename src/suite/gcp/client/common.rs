//! Common helpers for GCP Secret Manager clients
//!
//! Resource-path formatting and per-operation tracking shared by client
//! implementations.

use crate::observability::metrics;
use std::time::Instant;
use tracing::Span;

/// Formats a GCP secret resource path
pub fn format_secret_path(project_id: &str, secret_name: &str) -> String {
    format!("projects/{project_id}/secrets/{secret_name}")
}

/// Formats the latest-version access path for a secret
pub fn format_latest_version_path(project_id: &str, secret_name: &str) -> String {
    format!("projects/{project_id}/secrets/{secret_name}/versions/latest")
}

/// Formats the version-collection path for a secret
pub fn format_versions_path(project_id: &str, secret_name: &str) -> String {
    format!("projects/{project_id}/secrets/{secret_name}/versions")
}

/// Tracks one provider operation: duration, span attributes, metrics
pub struct OperationTracker {
    start: Instant,
    span: Span,
}

impl std::fmt::Debug for OperationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationTracker")
            .field("elapsed", &self.start.elapsed())
            .finish_non_exhaustive()
    }
}

impl OperationTracker {
    /// Start tracking an operation under the given span
    pub fn new(span: Span) -> Self {
        Self {
            start: Instant::now(),
            span,
        }
    }

    /// Record a successful operation
    pub fn record_success(&self, operation_type: &str) {
        self.span.record("operation.type", operation_type);
        self.span
            .record("operation.duration_ms", self.start.elapsed().as_millis() as u64);
        self.span.record("operation.success", true);
        metrics::record_secret_operation("gcp", operation_type, self.start.elapsed().as_secs_f64());
    }

    /// Record a failed operation
    pub fn record_error(&self, error_message: &str) {
        self.span.record("operation.success", false);
        self.span.record("error.message", error_message);
        self.span
            .record("operation.duration_ms", self.start.elapsed().as_millis() as u64);
        metrics::increment_provider_operation_errors("gcp");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_formatting() {
        assert_eq!(
            format_secret_path("my-project", "db-password"),
            "projects/my-project/secrets/db-password"
        );
        assert_eq!(
            format_latest_version_path("my-project", "db-password"),
            "projects/my-project/secrets/db-password/versions/latest"
        );
        assert_eq!(
            format_versions_path("my-project", "db-password"),
            "projects/my-project/secrets/db-password/versions"
        );
    }
}
