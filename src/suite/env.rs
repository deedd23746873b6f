//! # Environment Suite
//!
//! Non-cloud suite backed by process environment variables.
//!
//! Secret names map to variable names by uppercasing and replacing `-`, `.`
//! and `/` with `_` (`db-password` → `DB_PASSWORD`). Writes are not
//! supported: the process environment is read-only from the suite's point of
//! view.

use crate::error::SuiteError;
use crate::suite::{SecretValue, Suite, WriteOutcome};
use async_trait::async_trait;
use tracing::debug;

/// Suite reading secrets from process environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSuite;

impl EnvSuite {
    /// Create the environment suite
    pub fn new() -> Self {
        Self
    }

    fn env_var_name(secret_name: &str) -> String {
        secret_name
            .chars()
            .map(|c| match c {
                '-' | '.' | '/' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }
}

#[async_trait]
impl Suite for EnvSuite {
    fn provider(&self) -> &'static str {
        "env"
    }

    fn is_cloud(&self) -> bool {
        false
    }

    async fn get_secret_data(&self, secret_name: &str) -> Result<Option<String>, SuiteError> {
        if secret_name.is_empty() {
            return Ok(None);
        }

        let var = Self::env_var_name(secret_name);
        match std::env::var(&var) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => {
                debug!("env secret {} not present as {}", secret_name, var);
                Ok(None)
            }
            Err(std::env::VarError::NotUnicode(_)) => Err(SuiteError::InvalidPayload(format!(
                "{var} is not valid unicode"
            ))),
        }
    }

    async fn create_secret(
        &self,
        secret_name: &str,
        _value: SecretValue,
    ) -> Result<WriteOutcome, SuiteError> {
        if secret_name.is_empty() {
            return Ok(WriteOutcome::Skipped);
        }
        Err(SuiteError::Unsupported {
            provider: "env",
            operation: "create_secret",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_mapping() {
        assert_eq!(EnvSuite::env_var_name("db-password"), "DB_PASSWORD");
        assert_eq!(EnvSuite::env_var_name("app.api/key"), "APP_API_KEY");
    }

    #[tokio::test]
    async fn reads_from_process_environment() {
        std::env::set_var("ENV_SUITE_TEST_SECRET", "hunter2");
        let suite = EnvSuite::new();
        assert_eq!(
            suite.get_secret_data("env-suite-test-secret").await.unwrap(),
            Some("hunter2".to_string())
        );
        std::env::remove_var("ENV_SUITE_TEST_SECRET");
        assert_eq!(
            suite.get_secret_data("env-suite-test-secret").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn empty_name_and_writes() {
        let suite = EnvSuite::new();
        assert_eq!(suite.get_secret_data("").await.unwrap(), None);
        assert_eq!(
            suite.create_secret("", SecretValue::from("v")).await.unwrap(),
            WriteOutcome::Skipped
        );
        assert!(matches!(
            suite.create_secret("db-password", SecretValue::from("v")).await,
            Err(SuiteError::Unsupported { .. })
        ));
    }

    #[test]
    fn routing_flags() {
        let suite = EnvSuite::new();
        assert!(!suite.is_cloud());
        assert_eq!(suite.cache_key("db-password"), "secrets:env:db-password");
    }
}
