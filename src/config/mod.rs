//! # Configuration Management
//!
//! Connection parameters identify one Vault endpoint; client settings control how
//! the connection to it is built. Both can be loaded from `VAULT_API_*`
//! environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{Result, SecretsError};

/// Environment variable carrying the Vault API token.
pub const TOKEN_ENV_VAR: &str = "VAULT_API_TOKEN";

/// Default Vault host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Vault API port.
pub const DEFAULT_PORT: u16 = 8200;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Identifies one Vault endpoint.
///
/// Equality of two values decides whether a cached connection may serve a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct ConnectionParams {
    /// Host name or IP address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// API port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Use `https` instead of `http`
    pub use_tls: bool,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self { host: DEFAULT_HOST.to_string(), port: DEFAULT_PORT, use_tls: true }
    }
}

impl ConnectionParams {
    pub fn new(host: impl Into<String>, port: u16, use_tls: bool) -> Self {
        Self { host: host.into(), port, use_tls }
    }

    /// URL scheme selected by `use_tls`.
    pub fn scheme(&self) -> &'static str {
        if self.use_tls {
            "https"
        } else {
            "http"
        }
    }

    /// Base address of the endpoint, e.g. `https://localhost:8200`.
    pub fn endpoint(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    /// Load connection parameters from the environment.
    ///
    /// - `VAULT_API_HOST` (default: `localhost`)
    /// - `VAULT_API_PORT` (default: `8200`)
    /// - `VAULT_API_USE_TLS` (default: `true`)
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("VAULT_API_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match std::env::var("VAULT_API_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| SecretsError::config(format!("Invalid VAULT_API_PORT '{}': {}", raw, e)))?,
            Err(_) => DEFAULT_PORT,
        };

        let use_tls = match std::env::var("VAULT_API_USE_TLS") {
            Ok(raw) => parse_bool("VAULT_API_USE_TLS", &raw)?,
            Err(_) => true,
        };

        let params = Self { host, port, use_tls };
        params.validate()?;
        Ok(params)
    }
}

impl std::fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.endpoint())
    }
}

/// Settings controlling how the backend connection is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Accept invalid TLS certificates (self-signed dev servers)
    pub tls_skip_verify: bool,

    /// Timeout applied by the HTTP client to every request
    pub request_timeout: Duration,

    /// Environment variable consulted for the API token
    pub token_env_var: String,

    /// Optional file holding the API token, tried when the environment has none
    pub token_file: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            tls_skip_verify: false,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_env_var: TOKEN_ENV_VAR.to_string(),
            token_file: None,
        }
    }
}

impl ClientSettings {
    /// Load client settings from the environment.
    ///
    /// - `VAULT_API_TLS_SKIP_VERIFY` (default: `false`)
    /// - `VAULT_API_TIMEOUT_SECS` (default: `60`)
    /// - `VAULT_API_TOKEN_FILE` (default: unset)
    pub fn from_env() -> Result<Self> {
        let tls_skip_verify = match std::env::var("VAULT_API_TLS_SKIP_VERIFY") {
            Ok(raw) => parse_bool("VAULT_API_TLS_SKIP_VERIFY", &raw)?,
            Err(_) => false,
        };

        let request_timeout = match std::env::var("VAULT_API_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    SecretsError::config(format!("Invalid VAULT_API_TIMEOUT_SECS '{}': {}", raw, e))
                })?;
                if secs == 0 {
                    return Err(SecretsError::config("VAULT_API_TIMEOUT_SECS must be greater than 0"));
                }
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let token_file = std::env::var("VAULT_API_TOKEN_FILE")
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self { tls_skip_verify, request_timeout, token_env_var: TOKEN_ENV_VAR.to_string(), token_file })
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(SecretsError::config(format!("Invalid boolean for {}: '{}'", name, other))),
    }
}
