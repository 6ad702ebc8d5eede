//! Secret retrieval facade.
//!
//! [`SecretStoreClient::retrieve_secret`] ties the pieces together:
//! cached connection -> request path -> backend read -> field extraction.
//! Errors from every step reach the caller unchanged.
//!
//! Applications normally build one client and share it. For call sites that
//! cannot carry a handle, [`SecretStoreClient::global`] provides a lazily built
//! process-wide instance configured from the environment.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::credentials::CredentialResolver;
use super::envelope::extract_field;
use super::path::resolve_secret_path;
use super::registry::{CachedConnection, ClientRegistry};
use super::revision::SchemaRevision;
use super::vault::VaultHttpConnector;
use crate::config::{ClientSettings, ConnectionParams};
use crate::errors::{Result, SecretsError};

/// Identifies one field inside one secret document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretLocator {
    /// KV engine revision the secret lives in
    pub revision: SchemaRevision,
    /// Mount path of the secrets engine
    pub engine_name: String,
    /// Path of the secret below the engine
    pub sub_path: String,
    /// Field within the secret document
    pub field_name: String,
}

impl SecretLocator {
    pub fn new(
        revision: SchemaRevision,
        engine_name: impl Into<String>,
        sub_path: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            revision,
            engine_name: engine_name.into(),
            sub_path: sub_path.into(),
            field_name: field_name.into(),
        }
    }

    /// Request path this locator resolves to.
    pub fn path(&self) -> String {
        resolve_secret_path(self.revision, &self.engine_name, &self.sub_path)
    }
}

impl std::fmt::Display for SecretLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{} ({})", self.path(), self.field_name, self.revision)
    }
}

/// Reads single secret values from a Vault KV engine.
#[derive(Debug)]
pub struct SecretStoreClient {
    registry: ClientRegistry,
}

static GLOBAL_CLIENT: Lazy<SecretStoreClient> = Lazy::new(|| {
    let settings = ClientSettings::from_env().unwrap_or_else(|e| {
        warn!(error = %e, "Invalid Vault client settings in environment, using defaults");
        ClientSettings::default()
    });
    SecretStoreClient::from_settings(&settings)
});

impl SecretStoreClient {
    pub fn new(registry: ClientRegistry) -> Self {
        Self { registry }
    }

    /// Client talking to Vault over HTTP with the default credential chain.
    pub fn from_settings(settings: &ClientSettings) -> Self {
        let registry = ClientRegistry::new(
            Arc::new(VaultHttpConnector::new(settings)),
            CredentialResolver::default_chain(settings),
        );
        Self::new(registry)
    }

    /// Process-wide client configured from `VAULT_API_*` environment variables.
    pub fn global() -> &'static SecretStoreClient {
        &GLOBAL_CLIENT
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Retrieve the value of one secret field.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::CredentialMissing`] / [`SecretsError::ConnectionInit`] on first use
    ///   when no connection can be built
    /// - [`SecretsError::ConnectionParamsMismatch`] if the client is bound to another endpoint
    /// - [`SecretsError::SecretNotFound`] if there is no document at the resolved path
    /// - [`SecretsError::SecretFieldNotFound`] if the document lacks the field
    /// - [`SecretsError::MalformedEnvelope`] if the document has the wrong shape
    /// - backend and transport errors from the read itself
    #[instrument(skip(self, params, locator), fields(endpoint = %params, secret = %locator), name = "retrieve_secret")]
    pub async fn retrieve_secret(
        &self,
        params: &ConnectionParams,
        locator: &SecretLocator,
    ) -> Result<String> {
        let connection = self.registry.get_or_create(params).await?;
        read_field(&connection, locator).await
    }

    /// [`Self::retrieve_secret`] with the read bounded by a deadline.
    ///
    /// The deadline starts once the connection is available. Building it on first
    /// use may wait on the interactive token prompt, which cannot be abandoned
    /// without leaving the terminal mid-read. With `None` only the HTTP client's own
    /// request timeout applies.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::Timeout`] if the deadline elapses during the read
    #[instrument(skip(self, params, locator), fields(endpoint = %params, secret = %locator), name = "retrieve_secret")]
    pub async fn retrieve_secret_with_deadline(
        &self,
        params: &ConnectionParams,
        locator: &SecretLocator,
        deadline: Option<Duration>,
    ) -> Result<String> {
        let connection = self.registry.get_or_create(params).await?;
        let Some(deadline) = deadline else {
            return read_field(&connection, locator).await;
        };

        tokio::time::timeout(deadline, read_field(&connection, locator)).await.map_err(|_| {
            SecretsError::Timeout {
                operation: format!("read {}", locator.path()),
                duration_ms: deadline.as_millis() as u64,
            }
        })?
    }
}

async fn read_field(connection: &CachedConnection, locator: &SecretLocator) -> Result<String> {
    let path = locator.path();

    let envelope = connection.backend().read(&path).await?;
    let value = extract_field(locator.revision, envelope.as_ref(), &locator.field_name, &path)?;

    debug!(path = %path, field = %locator.field_name, "Secret value retrieved");
    Ok(value)
}

/// Retrieve a secret from the default endpoint (`https://localhost:8200`) using the
/// process-wide client.
pub async fn retrieve_secret_value(locator: &SecretLocator) -> Result<String> {
    retrieve_secret_value_from_endpoint(&ConnectionParams::default(), locator).await
}

/// Retrieve a secret from `params` using the process-wide client.
pub async fn retrieve_secret_value_from_endpoint(
    params: &ConnectionParams,
    locator: &SecretLocator,
) -> Result<String> {
    SecretStoreClient::global().retrieve_secret(params, locator).await
}
