//! Secret retrieval from HashiCorp Vault KV secrets engines.
//!
//! # Architecture
//!
//! Leaf first:
//!
//! - [`credentials`]: ordered chain of token sources (env var, terminal prompt, token file)
//! - [`path`]: request path for a secret under a [`SchemaRevision`]
//! - [`envelope`]: field extraction from a read response under a [`SchemaRevision`]
//! - [`registry`]: the once-built, shared backend connection
//! - [`client`]: the [`SecretStoreClient`] facade
//!
//! [`backend`] defines the seams to the store and [`vault`] implements them over
//! the Vault HTTP API.
//!
//! # Example
//!
//! ```rust,no_run
//! use vaultkv::config::{ClientSettings, ConnectionParams};
//! use vaultkv::secrets::{SchemaRevision, SecretLocator, SecretStoreClient};
//!
//! # async fn run() -> vaultkv::Result<()> {
//! let client = SecretStoreClient::from_settings(&ClientSettings::default());
//! let params = ConnectionParams::new("vault.internal", 8200, true);
//! let locator = SecretLocator::new(SchemaRevision::V2, "secret", "payments/db", "password");
//!
//! let password = client.retrieve_secret(&params, &locator).await?;
//! # let _ = password;
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! - Tokens and secret values are never logged or included in error messages
//! - The token lives in a zeroize-on-drop [`SecretString`]
//! - Interactive token input is read with terminal echo disabled

pub mod backend;
pub mod client;
pub mod credentials;
pub mod envelope;
pub mod path;
pub mod registry;
pub mod revision;
pub mod types;
pub mod vault;

pub use backend::{BackendConnector, KvBackend};
pub use client::{
    retrieve_secret_value, retrieve_secret_value_from_endpoint, SecretLocator, SecretStoreClient,
};
pub use credentials::{
    CredentialResolver, CredentialSource, EnvVarCredentialSource, PromptCredentialSource,
    SecretPrompt, TerminalPrompt, TokenFileCredentialSource,
};
pub use envelope::{extract_field, SecretEnvelope};
pub use path::{resolve_secret_path, resolve_secret_path_str};
pub use registry::{CachedConnection, ClientRegistry};
pub use revision::SchemaRevision;
pub use types::SecretString;
pub use vault::{VaultHttpBackend, VaultHttpConnector, VAULT_TOKEN_HEADER};
