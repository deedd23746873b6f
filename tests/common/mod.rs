//! Common test utilities
//!
//! Provides a recording in-memory provider client so suite tests can assert
//! exact provider call sequences and resulting version state.

use async_trait::async_trait;
use secret_manager_suite::{SecretManagerClient, SuiteError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;

/// Install the fmt subscriber once so failure records show up under
/// `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One failure record captured from the log sink
#[derive(Debug, Default, Clone)]
pub struct CapturedFailure {
    pub code: Option<u64>,
    pub severity: Option<u64>,
    pub operation: Option<String>,
}

/// Layer capturing the structured failure records the suites emit under the
/// `secret_manager_suite::failure` target.
#[derive(Debug, Default, Clone)]
pub struct FailureCapture {
    records: Arc<Mutex<Vec<CapturedFailure>>>,
}

impl FailureCapture {
    /// Install a thread-default subscriber that captures failure records.
    ///
    /// Keep the returned guard alive for the duration of the test.
    pub fn install() -> (tracing::subscriber::DefaultGuard, Self) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (guard, capture)
    }

    pub fn records(&self) -> Vec<CapturedFailure> {
        self.records.lock().unwrap().clone()
    }
}

struct FailureFields<'a>(&'a mut CapturedFailure);

impl tracing::field::Visit for FailureFields<'_> {
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        match field.name() {
            "code" => self.0.code = Some(value),
            "severity" => self.0.severity = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "operation" {
            self.0.operation = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, _field: &tracing::field::Field, _value: &dyn std::fmt::Debug) {}
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FailureCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if event.metadata().target() != "secret_manager_suite::failure" {
            return;
        }
        let mut record = CapturedFailure::default();
        event.record(&mut FailureFields(&mut record));
        self.records.lock().unwrap().push(record);
    }
}

/// One stored secret version
#[derive(Debug, Clone)]
pub struct Version {
    pub data: String,
    pub enabled: bool,
}

/// In-memory Secret Manager double that records every provider call.
///
/// Call log entries are `"{operation}:{secret_name}"`, in invocation order.
#[derive(Debug, Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<String>>,
    store: Mutex<HashMap<String, Vec<Version>>>,
    /// Error injected into the next `access_latest` call
    fail_next_access: Mutex<Option<SuiteError>>,
    /// Error injected into the next `create_secret` call
    fail_next_create: Mutex<Option<SuiteError>>,
    /// Per-call delay, for exercising concurrent callers
    pub delay: Option<Duration>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        let prefix = format!("{operation}:");
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(&prefix))
            .count()
    }

    pub fn versions(&self, secret_name: &str) -> Vec<Version> {
        self.store
            .lock()
            .unwrap()
            .get(secret_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn latest_enabled(&self, secret_name: &str) -> Option<String> {
        self.versions(secret_name)
            .iter()
            .rev()
            .find(|v| v.enabled)
            .map(|v| v.data.clone())
    }

    pub fn fail_next_access(&self, err: SuiteError) {
        *self.fail_next_access.lock().unwrap() = Some(err);
    }

    pub fn fail_next_create(&self, err: SuiteError) {
        *self.fail_next_create.lock().unwrap() = Some(err);
    }

    fn record(&self, operation: &str, secret_name: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{operation}:{secret_name}"));
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SecretManagerClient for RecordingClient {
    async fn create_secret(&self, secret_name: &str) -> Result<(), SuiteError> {
        self.record("create", secret_name);
        self.pause().await;

        if let Some(err) = self.fail_next_create.lock().unwrap().take() {
            return Err(err);
        }

        let mut store = self.store.lock().unwrap();
        if store.contains_key(secret_name) {
            return Err(SuiteError::Conflict(secret_name.to_string()));
        }
        store.insert(secret_name.to_string(), Vec::new());
        Ok(())
    }

    async fn add_secret_version(&self, secret_name: &str, data: &str) -> Result<(), SuiteError> {
        self.record("add", secret_name);
        self.pause().await;

        let mut store = self.store.lock().unwrap();
        let versions = store
            .get_mut(secret_name)
            .ok_or_else(|| SuiteError::NotFound(secret_name.to_string()))?;
        versions.push(Version {
            data: data.to_string(),
            enabled: true,
        });
        Ok(())
    }

    async fn access_latest(&self, secret_name: &str) -> Result<String, SuiteError> {
        self.record("access", secret_name);
        self.pause().await;

        if let Some(err) = self.fail_next_access.lock().unwrap().take() {
            return Err(err);
        }

        self.latest_enabled(secret_name)
            .ok_or_else(|| SuiteError::NotFound(secret_name.to_string()))
    }

    async fn get_secret(&self, secret_name: &str) -> Result<(), SuiteError> {
        self.record("get", secret_name);
        self.pause().await;

        if self.store.lock().unwrap().contains_key(secret_name) {
            Ok(())
        } else {
            Err(SuiteError::NotFound(secret_name.to_string()))
        }
    }

    async fn disable_enabled_versions(&self, secret_name: &str) -> Result<usize, SuiteError> {
        self.record("disable", secret_name);
        self.pause().await;

        let mut store = self.store.lock().unwrap();
        let versions = store
            .get_mut(secret_name)
            .ok_or_else(|| SuiteError::NotFound(secret_name.to_string()))?;
        let mut disabled = 0;
        for version in versions.iter_mut().filter(|v| v.enabled) {
            version.enabled = false;
            disabled += 1;
        }
        Ok(disabled)
    }
}
