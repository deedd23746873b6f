//! # Suites
//!
//! Provider adapters ("suites") behind a uniform secret-access contract.
//!
//! Each suite implements [`Suite`]: a read path that consults the shared
//! cache before the provider, and a write path that creates or reconciles a
//! secret in the provider. The facade routes between suites using
//! [`Suite::is_cloud`].

use crate::constants::CACHE_KEY_NAMESPACE;
use crate::error::SuiteError;
use async_trait::async_trait;

pub mod env;
pub mod gcp;

/// Value accepted by the write path.
///
/// Structured maps are serialized to a canonical JSON encoding before they
/// are compared or stored; `serde_json` keeps map keys sorted, so the
/// encoding is deterministic and round-trips to the original map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    /// Opaque string payload
    Text(String),
    /// Structured payload, stored as canonical JSON
    Map(serde_json::Map<String, serde_json::Value>),
}

impl SecretValue {
    /// Canonical string encoding used for comparison and storage.
    ///
    /// # Errors
    /// Returns `SuiteError::Serialization` if a map fails to encode.
    pub fn canonical(&self) -> Result<String, SuiteError> {
        match self {
            SecretValue::Text(text) => Ok(text.clone()),
            SecretValue::Map(map) => Ok(serde_json::to_string(map)?),
        }
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        SecretValue::Text(value.to_string())
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        SecretValue::Text(value)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for SecretValue {
    fn from(value: serde_json::Map<String, serde_json::Value>) -> Self {
        SecretValue::Map(value)
    }
}

/// Discriminated result of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Secret did not exist; created with one version
    Created,
    /// Secret existed with a different value; old versions disabled, new version added
    Rotated,
    /// Secret existed with the same value; nothing mutated
    Unchanged,
    /// Empty name; no provider traffic at all
    Skipped,
}

impl WriteOutcome {
    /// True when the provider state was mutated
    pub fn mutated(self) -> bool {
        matches!(self, WriteOutcome::Created | WriteOutcome::Rotated)
    }

    /// Operation label used for metrics
    pub fn as_str(self) -> &'static str {
        match self {
            WriteOutcome::Created => "create",
            WriteOutcome::Rotated => "update",
            WriteOutcome::Unchanged => "no_change",
            WriteOutcome::Skipped => "skip",
        }
    }
}

/// Uniform secret-access contract every provider adapter implements
#[async_trait]
pub trait Suite: Send + Sync {
    /// Stable provider id ("gcp", "env"); feeds cache-key namespacing and
    /// metrics labels
    fn provider(&self) -> &'static str;

    /// Whether this suite targets a cloud-hosted provider; used by the
    /// facade for routing decisions, not by the suite itself
    fn is_cloud(&self) -> bool;

    /// Deterministic cache key for a secret name, namespaced per provider so
    /// it cannot collide with cache keys from unrelated concerns
    fn cache_key(&self, secret_name: &str) -> String {
        format!("{CACHE_KEY_NAMESPACE}:{}:{secret_name}", self.provider())
    }

    /// Return the latest value of the named secret.
    ///
    /// `Ok(None)` means the name was empty or the provider holds no such
    /// secret; `Err` means the fetch itself failed. Idempotent and free of
    /// side effects other than cache population.
    ///
    /// # Errors
    /// Returns the underlying failure; a structured failure record has
    /// already been emitted to the log sink.
    async fn get_secret_data(&self, secret_name: &str) -> Result<Option<String>, SuiteError>;

    /// Ensure a secret named `secret_name` exists in the provider with the
    /// given value, creating it or rotating its value as needed.
    ///
    /// # Errors
    /// Returns the underlying failure; a structured failure record has
    /// already been emitted to the log sink.
    async fn create_secret(
        &self,
        secret_name: &str,
        value: SecretValue,
    ) -> Result<WriteOutcome, SuiteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_map_encoding_is_sorted_and_round_trips() {
        let mut map = serde_json::Map::new();
        map.insert("username".into(), serde_json::json!("app"));
        map.insert("password".into(), serde_json::json!("hunter2"));
        map.insert("port".into(), serde_json::json!(5432));

        let encoded = SecretValue::Map(map.clone()).canonical().unwrap();
        // serde_json maps are ordered by key, so the encoding is stable
        assert_eq!(
            encoded,
            r#"{"password":"hunter2","port":5432,"username":"app"}"#
        );

        let decoded: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn canonical_text_passes_through() {
        assert_eq!(
            SecretValue::from("hunter2").canonical().unwrap(),
            "hunter2"
        );
    }

    #[test]
    fn write_outcome_labels() {
        assert!(WriteOutcome::Created.mutated());
        assert!(WriteOutcome::Rotated.mutated());
        assert!(!WriteOutcome::Unchanged.mutated());
        assert!(!WriteOutcome::Skipped.mutated());
        assert_eq!(WriteOutcome::Rotated.as_str(), "update");
    }
}
