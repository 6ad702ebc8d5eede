//! # Error Handling
//!
//! Error types for secret retrieval using `thiserror`.
//!
//! The taxonomy separates two classes of failure:
//!
//! - **Fatal** ([`SecretsError::ConnectionInit`], [`SecretsError::CredentialMissing`]):
//!   the environment is misconfigured and no retrieval can succeed. These are still
//!   returned as values; only the binary entry point decides to exit.
//! - **Recoverable**: document and field level conditions the caller can branch on.
//!
//! Messages never carry credential or secret values.

use thiserror::Error;

/// Result type for secret retrieval operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while retrieving a secret value.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// The backend handle could not be built for the endpoint.
    #[error("Unable to initialize Vault client for {endpoint}: {message}")]
    ConnectionInit { endpoint: String, message: String },

    /// No credential could be obtained from any configured source.
    #[error("No Vault API token could be retrieved (tried: {})", tried.join(", "))]
    CredentialMissing { tried: Vec<String> },

    /// The locator names a schema revision this client does not know.
    #[error("Cannot deal with secret engine type '{revision}'")]
    UnsupportedSchemaRevision { revision: String },

    /// The backend holds no document at the resolved path.
    #[error("Secret '{path}' seems to be not available/existing")]
    SecretNotFound { path: String },

    /// The document exists but lacks the requested field.
    #[error("Secret '{field}' could not be found in secret data map at '{path}'")]
    SecretFieldNotFound { field: String, path: String },

    /// The document does not have the shape its schema revision requires.
    #[error("Malformed secret envelope at '{path}': {reason}")]
    MalformedEnvelope { path: String, reason: String },

    /// The cached connection was built for a different endpoint.
    #[error("Connection already cached for {cached}; refusing request for {requested}")]
    ConnectionParamsMismatch { cached: String, requested: String },

    /// The backend refused access to the path with the current token.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: String },

    /// The backend answered with an unexpected status.
    #[error("Backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// Network level failure talking to the backend.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A deadline elapsed before the operation completed.
    #[error("Operation timed out: {operation} after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error (terminal input, token files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SecretsError {
    /// Create a connection initialization error.
    pub fn connection_init(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionInit { endpoint: endpoint.into(), message: message.into() }
    }

    /// Create an unsupported schema revision error.
    pub fn unsupported_revision(revision: impl Into<String>) -> Self {
        Self::UnsupportedSchemaRevision { revision: revision.into() }
    }

    /// Create a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::SecretNotFound { path: path.into() }
    }

    /// Create a field not found error.
    pub fn field_not_found(field: impl Into<String>, path: impl Into<String>) -> Self {
        Self::SecretFieldNotFound { field: field.into(), path: path.into() }
    }

    /// Create a malformed envelope error.
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope { path: path.into(), reason: reason.into() }
    }

    /// Create a backend error.
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend { status, message: message.into() }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Whether this error means no retrieval can succeed in this environment.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionInit { .. } | Self::CredentialMissing { .. })
    }

    /// Whether the caller can reasonably branch on this error and continue.
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

impl From<validator::ValidationErrors> for SecretsError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Validation failed: {}", message))
    }
}
