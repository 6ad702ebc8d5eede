//! KV secrets engine schema revisions.
//!
//! Each revision carries both of its rules: how a request path is built and
//! where the requested fields live inside a read response. Supporting another
//! revision means adding a variant here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::envelope::SecretEnvelope;
use crate::errors::{Result, SecretsError};

/// Wrapper key KV v2 nests the secret's fields under.
pub const KV2_DATA_KEY: &str = "data";

/// Revision of the KV secrets engine a secret lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaRevision {
    /// KV version 1: flat documents at `<engine>/<path>`
    #[serde(rename = "kv1", alias = "v1", alias = "kv-v1")]
    V1,
    /// KV version 2: versioned documents at `<engine>/data/<path>`
    #[serde(rename = "kv-v2", alias = "v2", alias = "kv2")]
    V2,
}

impl SchemaRevision {
    /// Engine type name as Vault reports it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "kv1",
            Self::V2 => "kv-v2",
        }
    }

    /// Request path for a secret under this revision.
    pub fn secret_path(&self, engine_name: &str, sub_path: &str) -> String {
        match self {
            Self::V1 => format!("{}/{}", engine_name, sub_path),
            Self::V2 => format!("{}/{}/{}", engine_name, KV2_DATA_KEY, sub_path),
        }
    }

    /// The mapping holding the secret's fields within `envelope`.
    ///
    /// `path` only labels errors.
    pub fn field_container<'a>(
        &self,
        envelope: &'a SecretEnvelope,
        path: &str,
    ) -> Result<&'a Map<String, Value>> {
        match self {
            Self::V1 => Ok(envelope.as_map()),
            Self::V2 => match envelope.get(KV2_DATA_KEY) {
                Some(Value::Object(nested)) => Ok(nested),
                Some(Value::Null) | None => Err(SecretsError::malformed(
                    path,
                    format!("missing '{}' wrapper in kv-v2 response", KV2_DATA_KEY),
                )),
                Some(other) => Err(SecretsError::malformed(
                    path,
                    format!(
                        "'{}' wrapper in kv-v2 response is {} instead of an object",
                        KV2_DATA_KEY,
                        json_type_name(other)
                    ),
                )),
            },
        }
    }
}

impl fmt::Display for SchemaRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaRevision {
    type Err = SecretsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kv1" | "kv-v1" | "kv" | "v1" | "1" => Ok(Self::V1),
            "kv-v2" | "kv2" | "v2" | "2" => Ok(Self::V2),
            _ => Err(SecretsError::unsupported_revision(s)),
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
