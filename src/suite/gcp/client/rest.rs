//! GCP Secret Manager REST Client
//!
//! Native REST implementation for GCP Secret Manager API v1, using reqwest
//! and OAuth2 bearer tokens.
//!
//! Authentication comes from the GCE metadata server (Workload Identity) or
//! from a pre-issued token (`GCP_ACCESS_TOKEN`, or [`SecretManagerRest::with_access_token`]
//! for tests against mock servers).
//!
//! References:
//! - [GCP Secret Manager REST API v1](https://docs.cloud.google.com/secret-manager/docs/reference/rest)

use crate::config::SuiteConfig;
use crate::constants::{ENV_GCP_ACCESS_TOKEN, METADATA_TOKEN_URL};
use crate::error::SuiteError;
use crate::suite::gcp::client::common::{
    format_latest_version_path, format_secret_path, format_versions_path, OperationTracker,
};
use crate::suite::gcp::client::SecretManagerClient;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use futures::future::try_join_all;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Instrument};

/// GCP Secret Manager REST client
pub struct SecretManagerRest {
    http_client: Client,
    base_url: String,
    project_id: String,
    access_token: String,
}

// ============================================================================
// GCP Secret Manager REST API Request/Response Structures
// ============================================================================

/// Replication configuration for a secret; only automatic replication is
/// supported here
#[derive(Debug, Serialize, Deserialize)]
struct Replication {
    #[serde(rename = "automatic")]
    automatic: Option<AutomaticReplication>,
}

/// Automatic replication: the secret is replicated to all regions
#[derive(Debug, Serialize, Deserialize)]
struct AutomaticReplication {}

/// Secret payload; `data` is base64-encoded on the wire
#[derive(Debug, Serialize, Deserialize)]
struct SecretPayload {
    data: String,
}

/// Body for `POST /v1/projects/{project}/secrets`
#[derive(Debug, Serialize)]
struct CreateSecretRequest {
    #[serde(rename = "secretId")]
    secret_id: String,
    replication: Replication,
}

/// Body for `POST /v1/projects/{project}/secrets/{secret}:addVersion`
#[derive(Debug, Serialize)]
struct AddVersionRequest {
    payload: SecretPayload,
}

/// Response from `GET .../versions/latest:access`
#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    #[allow(dead_code, reason = "required for deserialization, payload is all we use")]
    name: String,
    payload: SecretPayload,
}

/// One entry from `GET .../versions`
#[derive(Debug, Deserialize)]
struct SecretVersionInfo {
    name: String,
    #[serde(default)]
    state: String,
}

/// Response from `GET .../versions`
#[derive(Debug, Deserialize)]
struct ListVersionsResponse {
    #[serde(default)]
    versions: Vec<SecretVersionInfo>,
}

/// GCP API error response wrapper
#[derive(Debug, Deserialize)]
struct GcpErrorResponse {
    error: GcpError,
}

/// Error details returned by the GCP API
#[derive(Debug, Deserialize)]
struct GcpError {
    code: u16,
    message: String,
    status: String,
}

/// OAuth2 access token response from the GCE metadata server
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code, reason = "required for deserialization but not used after parsing")]
    token_type: String,
    #[allow(dead_code, reason = "required for deserialization but not used after parsing")]
    expires_in: u64,
}

impl std::fmt::Debug for SecretManagerRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretManagerRest")
            .field("project_id", &self.project_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SecretManagerRest {
    /// Create a client, resolving an access token from `GCP_ACCESS_TOKEN` or
    /// the metadata server.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or no access
    /// token can be obtained.
    pub async fn new(config: &SuiteConfig) -> Result<Self, SuiteError> {
        let http_client = Client::builder().build()?;
        let access_token = Self::resolve_access_token(&http_client).await?;
        info!(
            "Initialized GCP Secret Manager REST client for project: {}",
            config.project_id
        );
        Ok(Self::assemble(config, http_client, access_token))
    }

    /// Create a client with a pre-issued access token.
    ///
    /// Used by tests pointing `config.endpoint` at a mock server.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_access_token(
        config: &SuiteConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, SuiteError> {
        let http_client = Client::builder().build()?;
        Ok(Self::assemble(config, http_client, access_token.into()))
    }

    fn assemble(config: &SuiteConfig, http_client: Client, access_token: String) -> Self {
        Self {
            http_client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            access_token,
        }
    }

    /// Resolve an OAuth2 access token.
    ///
    /// Order: `GCP_ACCESS_TOKEN` environment override, then the GCE metadata
    /// server (Workload Identity).
    async fn resolve_access_token(http_client: &Client) -> Result<String, SuiteError> {
        if let Ok(token) = std::env::var(ENV_GCP_ACCESS_TOKEN) {
            debug!("Using access token from {}", ENV_GCP_ACCESS_TOKEN);
            return Ok(token);
        }

        match http_client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                let token: TokenResponse = response.json().await.map_err(|e| {
                    SuiteError::Config(format!(
                        "failed to parse token response from metadata server: {e}"
                    ))
                })?;
                info!("Retrieved access token from metadata server (Workload Identity)");
                Ok(token.access_token)
            }
            Ok(response) => Err(SuiteError::Config(format!(
                "metadata server returned status {} while fetching access token",
                response.status()
            ))),
            Err(e) => Err(SuiteError::Config(format!(
                "failed to get access token: metadata server not available ({e}); \
                 run with Workload Identity or set {ENV_GCP_ACCESS_TOKEN}"
            ))),
        }
    }

    /// Build a request with authentication headers.
    ///
    /// `path` is either a resource path under `/v1/` or a full URL.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}/v1/{}", self.base_url, path)
        };

        self.http_client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
    }

    /// Map a non-success response to a classified error
    async fn error_from_response(
        response: reqwest::Response,
        secret_name: &str,
    ) -> SuiteError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(parsed) = serde_json::from_str::<GcpErrorResponse>(&body) {
            let error = parsed.error;
            if error.code == 404 || error.status == "NOT_FOUND" {
                return SuiteError::NotFound(secret_name.to_string());
            }
            if error.code == 409 || error.status == "ALREADY_EXISTS" {
                return SuiteError::Conflict(secret_name.to_string());
            }
            return SuiteError::Provider {
                code: error.code,
                status: error.status,
                message: error.message,
            };
        }

        match status.as_u16() {
            404 => SuiteError::NotFound(secret_name.to_string()),
            409 => SuiteError::Conflict(secret_name.to_string()),
            code => SuiteError::Provider {
                code,
                status: status.to_string(),
                message: body,
            },
        }
    }

    fn operation_span(operation: &'static str, secret_name: &str, project_id: &str) -> tracing::Span {
        info_span!(
            "gcp.secret.operation",
            gcp.operation = operation,
            secret.name = secret_name,
            project.id = project_id,
            operation.type = tracing::field::Empty,
            operation.success = tracing::field::Empty,
            operation.duration_ms = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    }

    async fn create_secret_inner(&self, secret_name: &str) -> Result<(), SuiteError> {
        let body = CreateSecretRequest {
            secret_id: secret_name.to_string(),
            replication: Replication {
                automatic: Some(AutomaticReplication {}),
            },
        };

        let response = self
            .request(Method::POST, &format!("projects/{}/secrets", self.project_id))
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response, secret_name).await)
        }
    }

    async fn add_secret_version_inner(
        &self,
        secret_name: &str,
        data: &str,
    ) -> Result<(), SuiteError> {
        let body = AddVersionRequest {
            payload: SecretPayload {
                data: general_purpose::STANDARD.encode(data.as_bytes()),
            },
        };

        let path = format!(
            "{}:addVersion",
            format_secret_path(&self.project_id, secret_name)
        );
        let response = self.request(Method::POST, &path).json(&body).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response, secret_name).await)
        }
    }

    async fn access_latest_inner(&self, secret_name: &str) -> Result<String, SuiteError> {
        let path = format!(
            "{}:access",
            format_latest_version_path(&self.project_id, secret_name)
        );
        let response = self.request(Method::GET, &path).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, secret_name).await);
        }

        let access: AccessSecretVersionResponse = response.json().await.map_err(|e| {
            SuiteError::InvalidPayload(format!("failed to parse secret version response: {e}"))
        })?;

        let decoded = general_purpose::STANDARD
            .decode(access.payload.data.as_bytes())
            .map_err(|e| {
                SuiteError::InvalidPayload(format!("failed to decode base64 secret data: {e}"))
            })?;
        String::from_utf8(decoded)
            .map_err(|e| SuiteError::InvalidPayload(format!("secret value is not valid UTF-8: {e}")))
    }

    async fn get_secret_inner(&self, secret_name: &str) -> Result<(), SuiteError> {
        let path = format_secret_path(&self.project_id, secret_name);
        let response = self.request(Method::GET, &path).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response, secret_name).await)
        }
    }

    async fn disable_version(&self, version_name: &str, secret_name: &str) -> Result<(), SuiteError> {
        debug!("Disabling secret version: {}", version_name);
        let response = self
            .request(Method::POST, &format!("{version_name}:disable"))
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response, secret_name).await)
        }
    }

    async fn disable_enabled_versions_inner(&self, secret_name: &str) -> Result<usize, SuiteError> {
        let path = format_versions_path(&self.project_id, secret_name);
        let response = self.request(Method::GET, &path).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, secret_name).await);
        }

        let listing: ListVersionsResponse = response.json().await.map_err(|e| {
            SuiteError::InvalidPayload(format!("failed to parse version listing: {e}"))
        })?;

        let enabled: Vec<&SecretVersionInfo> = listing
            .versions
            .iter()
            .filter(|v| v.state == "ENABLED")
            .collect();

        try_join_all(
            enabled
                .iter()
                .map(|version| self.disable_version(&version.name, secret_name)),
        )
        .await?;

        Ok(enabled.len())
    }
}

#[async_trait]
impl SecretManagerClient for SecretManagerRest {
    async fn create_secret(&self, secret_name: &str) -> Result<(), SuiteError> {
        let span = Self::operation_span("create", secret_name, &self.project_id);
        let tracker = OperationTracker::new(span.clone());
        info!("Creating new GCP secret: {}", secret_name);

        let result = self.create_secret_inner(secret_name).instrument(span).await;
        match &result {
            Ok(()) => tracker.record_success("create"),
            Err(e) => tracker.record_error(&e.to_string()),
        }
        result
    }

    async fn add_secret_version(&self, secret_name: &str, data: &str) -> Result<(), SuiteError> {
        let span = Self::operation_span("add_version", secret_name, &self.project_id);
        let tracker = OperationTracker::new(span.clone());

        let result = self
            .add_secret_version_inner(secret_name, data)
            .instrument(span)
            .await;
        match &result {
            Ok(()) => tracker.record_success("add_version"),
            Err(e) => tracker.record_error(&e.to_string()),
        }
        result
    }

    async fn access_latest(&self, secret_name: &str) -> Result<String, SuiteError> {
        let span = Self::operation_span("access", secret_name, &self.project_id);
        let tracker = OperationTracker::new(span.clone());

        let result = self.access_latest_inner(secret_name).instrument(span).await;
        match &result {
            Ok(_) => tracker.record_success("access"),
            // Absence is an answer, not a provider failure
            Err(e) if e.is_not_found() => tracker.record_success("access"),
            Err(e) => tracker.record_error(&e.to_string()),
        }
        result
    }

    async fn get_secret(&self, secret_name: &str) -> Result<(), SuiteError> {
        let span = Self::operation_span("get_metadata", secret_name, &self.project_id);
        let tracker = OperationTracker::new(span.clone());

        let result = self.get_secret_inner(secret_name).instrument(span).await;
        match &result {
            Ok(()) => tracker.record_success("get_metadata"),
            Err(e) if e.is_not_found() => tracker.record_success("get_metadata"),
            Err(e) => tracker.record_error(&e.to_string()),
        }
        result
    }

    async fn disable_enabled_versions(&self, secret_name: &str) -> Result<usize, SuiteError> {
        let span = Self::operation_span("disable_versions", secret_name, &self.project_id);
        let tracker = OperationTracker::new(span.clone());
        info!("Disabling enabled versions of GCP secret: {}", secret_name);

        let result = self
            .disable_enabled_versions_inner(secret_name)
            .instrument(span)
            .await;
        match &result {
            Ok(_) => tracker.record_success("disable_versions"),
            Err(e) => tracker.record_error(&e.to_string()),
        }
        result
    }
}
