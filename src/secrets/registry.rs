//! Lazily built, shared backend connection.
//!
//! A [`ClientRegistry`] owns at most one [`CachedConnection`]. The first
//! [`ClientRegistry::get_or_create`] call resolves the token and builds the
//! connection; concurrent callers racing on the empty registry wait for that single
//! construction and then share its result. A failed construction leaves the
//! registry empty so a later call can try again.
//!
//! The registry serves exactly one endpoint. Requests for different
//! [`ConnectionParams`] after the connection is cached are rejected with
//! [`SecretsError::ConnectionParamsMismatch`] instead of silently reusing it.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::backend::{BackendConnector, KvBackend};
use super::credentials::CredentialResolver;
use crate::config::ConnectionParams;
use crate::errors::{Result, SecretsError};

/// An authenticated backend handle together with the parameters it was built for.
#[derive(Debug)]
pub struct CachedConnection {
    params: ConnectionParams,
    backend: Arc<dyn KvBackend>,
}

impl CachedConnection {
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn backend(&self) -> &Arc<dyn KvBackend> {
        &self.backend
    }
}

/// Builds the shared connection once and hands it out afterwards.
pub struct ClientRegistry {
    connector: Arc<dyn BackendConnector>,
    resolver: CredentialResolver,
    cached: OnceCell<Arc<CachedConnection>>,
}

impl ClientRegistry {
    pub fn new(connector: Arc<dyn BackendConnector>, resolver: CredentialResolver) -> Self {
        Self { connector, resolver, cached: OnceCell::new() }
    }

    /// Return the cached connection, building it on first use.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::CredentialMissing`] if no token could be obtained
    /// - [`SecretsError::ConnectionInit`] if the backend handle cannot be built
    /// - [`SecretsError::ConnectionParamsMismatch`] if a connection for other
    ///   parameters is already cached
    pub async fn get_or_create(&self, params: &ConnectionParams) -> Result<Arc<CachedConnection>> {
        let connection = self.cached.get_or_try_init(|| self.build(params)).await?;

        if connection.params != *params {
            return Err(SecretsError::ConnectionParamsMismatch {
                cached: connection.params.endpoint(),
                requested: params.endpoint(),
            });
        }

        Ok(Arc::clone(connection))
    }

    /// Whether the connection has been built.
    pub fn is_initialized(&self) -> bool {
        self.cached.initialized()
    }

    /// Parameters of the cached connection, if any.
    pub fn cached_params(&self) -> Option<&ConnectionParams> {
        self.cached.get().map(|c| &c.params)
    }

    async fn build(&self, params: &ConnectionParams) -> Result<Arc<CachedConnection>> {
        let endpoint = params.endpoint();

        let token = self.resolver.resolve().await.inspect_err(|e| {
            error!(endpoint = %endpoint, error = %e, "Unable to obtain vault api token");
        })?;

        let backend = self.connector.connect(params, token).await.inspect_err(|e| {
            error!(endpoint = %endpoint, error = %e, "Unable to initialize Vault client");
        })?;

        info!(endpoint = %endpoint, "Vault api client object created and cached");

        Ok(Arc::new(CachedConnection { params: params.clone(), backend }))
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("resolver", &self.resolver)
            .field("cached", &self.cached_params().map(|p| p.endpoint()))
            .finish()
    }
}
