//! # Command Line Interface
//!
//! `vaultkv <ENGINE_TYPE> <ENGINE> <SUB_PATH> <FIELD>` prints one secret value to
//! stdout. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::config::{ClientSettings, ConnectionParams, DEFAULT_PORT, TOKEN_ENV_VAR};
use crate::secrets::{SchemaRevision, SecretLocator, SecretStoreClient};

#[derive(Parser, Debug)]
#[command(name = "vaultkv")]
#[command(about = "Read a single secret value from a Vault KV secrets engine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Secrets engine type: kv1 or kv-v2
    pub engine_type: SchemaRevision,

    /// Mount path of the secrets engine
    pub engine: String,

    /// Path of the secret below the engine
    pub sub_path: String,

    /// Field to print
    pub field: String,

    /// Vault host
    #[arg(long, env = "VAULT_API_HOST", default_value = "localhost")]
    pub host: String,

    /// Vault API port
    #[arg(long, env = "VAULT_API_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Talk plain HTTP instead of HTTPS
    #[arg(long)]
    pub no_tls: bool,

    /// Accept invalid TLS certificates
    #[arg(long, env = "VAULT_API_TLS_SKIP_VERIFY")]
    pub tls_skip_verify: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "VAULT_API_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout: u64,

    /// Deadline in seconds for reading the secret, once connected
    #[arg(long)]
    pub deadline: Option<u64>,

    /// File holding the Vault API token, used when VAULT_API_TOKEN is unset
    #[arg(long, env = "VAULT_API_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams::new(self.host.clone(), self.port, !self.no_tls)
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            tls_skip_verify: self.tls_skip_verify,
            request_timeout: Duration::from_secs(self.timeout),
            token_env_var: TOKEN_ENV_VAR.to_string(),
            token_file: self.token_file.clone(),
        }
    }

    pub fn locator(&self) -> SecretLocator {
        SecretLocator::new(self.engine_type, &self.engine, &self.sub_path, &self.field)
    }
}

/// Retrieve the secret the command line asks for.
pub async fn run(cli: &Cli) -> anyhow::Result<String> {
    let params = cli.connection_params();
    let locator = cli.locator();
    debug!(endpoint = %params, secret = %locator, "Retrieving secret");

    let client = SecretStoreClient::from_settings(&cli.client_settings());
    client
        .retrieve_secret_with_deadline(&params, &locator, cli.deadline.map(Duration::from_secs))
        .await
        .with_context(|| format!("Failed to retrieve {}", locator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positional_and_flags() {
        let cli = Cli::try_parse_from([
            "vaultkv",
            "kv-v2",
            "sec-engine-v2",
            "secret-v2",
            "key",
            "--host",
            "127.0.0.1",
            "--port",
            "18200",
            "--no-tls",
            "--deadline",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.engine_type, SchemaRevision::V2);
        assert_eq!(cli.connection_params(), ConnectionParams::new("127.0.0.1", 18200, false));
        assert_eq!(cli.locator().path(), "sec-engine-v2/data/secret-v2");
        assert_eq!(cli.deadline, Some(5));
        assert_eq!(cli.client_settings().request_timeout, Duration::from_secs(cli.timeout));
    }

    #[test]
    fn test_unknown_engine_type_rejected() {
        let result = Cli::try_parse_from(["vaultkv", "kv3", "engine", "path", "field"]);
        assert!(result.is_err());
    }
}
