//! HashiCorp Vault HTTP API backend.
//!
//! Reads go to `GET {scheme}://{host}:{port}/v1/{path}` with the token in the
//! `X-Vault-Token` header. The `data` object of a successful response becomes the
//! [`SecretEnvelope`]; a 404 means there is no document at the path.
//!
//! # Security
//!
//! - The token is held as a [`SecretString`] and never logged
//! - TLS certificate verification is on unless `tls_skip_verify` is set

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use validator::Validate;

use super::backend::{BackendConnector, KvBackend};
use super::envelope::SecretEnvelope;
use super::types::SecretString;
use crate::config::{ClientSettings, ConnectionParams};
use crate::errors::{Result, SecretsError};

/// Header carrying the Vault token.
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Body of a successful logical read.
#[derive(Debug, Deserialize)]
struct ReadResponse {
    #[serde(default)]
    data: Option<Value>,
}

/// Body Vault sends with error statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Builds [`VaultHttpBackend`] handles from [`ClientSettings`].
#[derive(Debug, Clone, Default)]
pub struct VaultHttpConnector {
    tls_skip_verify: bool,
    request_timeout: Duration,
}

impl VaultHttpConnector {
    pub fn new(settings: &ClientSettings) -> Self {
        Self { tls_skip_verify: settings.tls_skip_verify, request_timeout: settings.request_timeout }
    }
}

#[async_trait]
impl BackendConnector for VaultHttpConnector {
    async fn connect(&self, params: &ConnectionParams, token: SecretString) -> Result<Arc<dyn KvBackend>> {
        let endpoint = params.endpoint();

        params
            .validate()
            .map_err(|e| SecretsError::connection_init(&endpoint, SecretsError::from(e).to_string()))?;

        let base_url = Url::parse(&endpoint).map_err(|e| {
            SecretsError::connection_init(&endpoint, format!("Invalid Vault address: {}", e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SecretsError::connection_init(&endpoint, "Vault address cannot carry a path"));
        }

        if self.tls_skip_verify && params.use_tls {
            warn!(endpoint = %endpoint, "TLS certificate verification disabled for Vault client");
        }

        let mut builder = Client::builder().danger_accept_invalid_certs(self.tls_skip_verify);
        if !self.request_timeout.is_zero() {
            builder = builder.timeout(self.request_timeout);
        }
        let client = builder.build().map_err(|e| {
            SecretsError::connection_init(&endpoint, format!("Failed to build HTTP client: {}", e))
        })?;

        info!(endpoint = %endpoint, "Vault api client created");

        Ok(Arc::new(VaultHttpBackend {
            client,
            base_url,
            endpoint,
            token,
            request_timeout: self.request_timeout,
        }))
    }
}

/// Authenticated Vault HTTP API handle.
///
/// `reqwest::Client` pools connections internally and is safe to share across
/// concurrent reads.
pub struct VaultHttpBackend {
    client: Client,
    base_url: Url,
    endpoint: String,
    token: SecretString,
    request_timeout: Duration,
}

impl std::fmt::Debug for VaultHttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultHttpBackend")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token)
            .field("client", &"[reqwest::Client]")
            .finish()
    }
}

impl VaultHttpBackend {
    /// `{endpoint}/v1/{path}` with every `/`-separated piece of `path`
    /// percent-encoded, so `#`, `?` and `%` stay part of the document name.
    fn url_for(&self, path: &str) -> Result<Url> {
        // The url crate silently drops dot segments, which would address another document.
        if path.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(SecretsError::config(format!(
                "Secret path '{}' must not contain '.' or '..' segments",
                path
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SecretsError::transport(format!("{} cannot carry a path", self.endpoint)))?
            .clear()
            .push("v1")
            .extend(path.split('/'));
        Ok(url)
    }

    fn map_send_error(&self, e: reqwest::Error, path: &str) -> SecretsError {
        if e.is_timeout() {
            SecretsError::Timeout {
                operation: format!("read {}", path),
                duration_ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            SecretsError::transport(format!("Failed to read '{}' from {}: {}", path, self.endpoint, e))
        }
    }
}

#[async_trait]
impl KvBackend for VaultHttpBackend {
    async fn read(&self, path: &str) -> Result<Option<SecretEnvelope>> {
        debug!(path = %path, endpoint = %self.endpoint, "Reading secret from Vault");

        let response = self
            .client
            .get(self.url_for(path)?)
            .header(VAULT_TOKEN_HEADER, self.token.expose_secret())
            .send()
            .await
            .map_err(|e| self.map_send_error(e, path))?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => {
                debug!(path = %path, "Vault reports no secret at path");
                Ok(None)
            }
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::FORBIDDEN => {
                warn!(path = %path, "Vault denied access to secret path");
                Err(SecretsError::PermissionDenied { path: path.to_string() })
            }
            s if s.is_success() => {
                let body: ReadResponse = response.json().await.map_err(|e| {
                    SecretsError::malformed(path, format!("Invalid JSON in Vault response: {}", e))
                })?;

                match body.data {
                    Some(data) => SecretEnvelope::try_from(data).map(Some).map_err(|_| {
                        SecretsError::malformed(path, "'data' in Vault response is not an object")
                    }),
                    None => Err(SecretsError::malformed(path, "Vault response carries no 'data' object")),
                }
            }
            s => {
                let errors = response.json::<ErrorResponse>().await.unwrap_or_default().errors;
                let message = if errors.is_empty() {
                    s.canonical_reason().unwrap_or("unexpected status").to_string()
                } else {
                    errors.join("; ")
                };
                warn!(path = %path, status = s.as_u16(), "Vault read failed");
                Err(SecretsError::backend(s.as_u16(), message))
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
