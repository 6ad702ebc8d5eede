//! Mock Vault server for integration tests.
//!
//! Seeds a KV v1 secret at `sec-engine-v1/secret-v1` and a KV v2 secret at
//! `sec-engine-v2/secret-v2`, both readable only with [`TEST_TOKEN`].

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vaultkv::config::{ClientSettings, ConnectionParams};
use vaultkv::secrets::{
    ClientRegistry, CredentialResolver, EnvVarCredentialSource, SecretStoreClient,
    VaultHttpConnector, VAULT_TOKEN_HEADER,
};

pub const TEST_TOKEN: &str = "s.integration-test-token";

static ENV_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Vault stand-in seeded with one v1 and one v2 secret.
pub struct MockVault {
    pub server: MockServer,
}

impl MockVault {
    pub async fn start() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/sec-engine-v1/secret-v1"))
            .and(header(VAULT_TOKEN_HEADER, TEST_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "request_id": "7d2b4a51-0c4c-4b7e-9d7e-1f0a3c1a2b01",
                "lease_id": "",
                "renewable": false,
                "lease_duration": 2764800,
                "data": { "key": "value-v1", "other": "unused" }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/sec-engine-v2/data/secret-v2"))
            .and(header(VAULT_TOKEN_HEADER, TEST_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "request_id": "7d2b4a51-0c4c-4b7e-9d7e-1f0a3c1a2b02",
                "lease_id": "",
                "renewable": false,
                "lease_duration": 0,
                "data": {
                    "data": { "key": "value-v2" },
                    "metadata": {
                        "created_time": "2024-01-01T00:00:00.000000Z",
                        "deletion_time": "",
                        "destroyed": false,
                        "version": 1
                    }
                }
            })))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Serve `status` with a Vault error body for `request_path`.
    pub async fn mount_error(&self, request_path: &str, status: u16, errors: &[&str]) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "errors": errors })))
            .mount(&self.server)
            .await;
    }

    /// Serve the v1 secret after `delay`.
    pub async fn mount_slow(&self, request_path: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "key": "late" } }))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Connection parameters pointing at the mock over plain HTTP.
    pub fn params(&self) -> ConnectionParams {
        let address = self.server.address();
        ConnectionParams::new(address.ip().to_string(), address.port(), false)
    }
}

/// Client whose token comes from a fresh, test-private env var.
pub fn client_with_token(token: Option<&str>) -> SecretStoreClient {
    let var_name = format!(
        "VAULTKV_IT_TOKEN_{}_{}",
        std::process::id(),
        ENV_COUNTER.fetch_add(1, Ordering::SeqCst)
    );
    match token {
        Some(token) => std::env::set_var(&var_name, token),
        None => std::env::remove_var(&var_name),
    }

    let resolver = CredentialResolver::new(vec![Box::new(EnvVarCredentialSource::new(var_name))]);
    let connector = Arc::new(VaultHttpConnector::new(&ClientSettings::default()));
    SecretStoreClient::new(ClientRegistry::new(connector, resolver))
}
