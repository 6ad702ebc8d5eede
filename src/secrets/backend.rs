//! Backend seams.
//!
//! [`KvBackend`] is an authenticated handle able to read documents by path;
//! [`BackendConnector`] builds one for an endpoint and token. The Vault HTTP API
//! implementation lives in [`super::vault`].

use async_trait::async_trait;
use std::sync::Arc;

use super::envelope::SecretEnvelope;
use super::types::SecretString;
use crate::config::ConnectionParams;
use crate::errors::Result;

/// An authenticated handle to a secret store.
///
/// Implementations must be safe for concurrent reads once built.
#[async_trait]
pub trait KvBackend: Send + Sync + std::fmt::Debug {
    /// Read the document at `path`.
    ///
    /// Returns `Ok(None)` when the backend reports that nothing exists there.
    async fn read(&self, path: &str) -> Result<Option<SecretEnvelope>>;

    /// Base address this handle talks to.
    fn endpoint(&self) -> &str;
}

/// Builds [`KvBackend`] handles.
#[async_trait]
pub trait BackendConnector: Send + Sync {
    /// Build a handle for `params` that authenticates with `token`.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::SecretsError::ConnectionInit`] if the endpoint is malformed or
    ///   the HTTP/TLS stack cannot be set up
    async fn connect(&self, params: &ConnectionParams, token: SecretString) -> Result<Arc<dyn KvBackend>>;
}
