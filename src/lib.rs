//! # vaultkv
//!
//! Retrieve single secret values from HashiCorp Vault KV secrets engines
//! (versions 1 and 2) given an endpoint and a secret locator.
//!
//! ## Architecture
//!
//! ```text
//! SecretStoreClient ─→ ClientRegistry ─→ CredentialResolver (env → file → prompt)
//!        │                    └────────→ VaultHttpConnector ─→ VaultHttpBackend
//!        ├─→ resolve_secret_path (SchemaRevision)
//!        └─→ extract_field (SchemaRevision)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vaultkv::secrets::{retrieve_secret_value, SchemaRevision, SecretLocator};
//!
//! #[tokio::main]
//! async fn main() -> vaultkv::Result<()> {
//!     let locator = SecretLocator::new(SchemaRevision::V1, "sec-engine-v1", "secret-v1", "key");
//!     let value = retrieve_secret_value(&locator).await?;
//!     # let _ = value;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod secrets;

// Re-export commonly used types
pub use config::{ClientSettings, ConnectionParams};
pub use errors::{Result, SecretsError};
pub use secrets::{SchemaRevision, SecretLocator, SecretStoreClient};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
