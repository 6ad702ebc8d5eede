//! Read responses and field extraction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::revision::{json_type_name, SchemaRevision};
use crate::errors::{Result, SecretsError};

/// The `data` object of a Vault read response, before field extraction.
///
/// KV v1 returns the secret's fields directly; KV v2 wraps them in a nested
/// `data` object next to version metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretEnvelope(Map<String, Value>);

impl SecretEnvelope {
    pub fn new(data: Map<String, Value>) -> Self {
        Self(data)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for SecretEnvelope {
    type Error = Value;

    /// Accepts JSON objects only; any other value is handed back.
    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

/// Pull `field_name` out of a read response.
///
/// `envelope` is `None` when the backend had no document at `path`.
///
/// # Errors
///
/// - [`SecretsError::SecretNotFound`] if there is no document
/// - [`SecretsError::MalformedEnvelope`] if the document does not match the revision's
///   shape, or the field holds something other than a string
/// - [`SecretsError::SecretFieldNotFound`] if the document lacks the field
pub fn extract_field(
    revision: SchemaRevision,
    envelope: Option<&SecretEnvelope>,
    field_name: &str,
    path: &str,
) -> Result<String> {
    let envelope = envelope.ok_or_else(|| SecretsError::not_found(path))?;
    let fields = revision.field_container(envelope, path)?;

    match fields.get(field_name) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(SecretsError::malformed(
            path,
            format!("field '{}' is {} instead of a string", field_name, json_type_name(other)),
        )),
        None => Err(SecretsError::field_not_found(field_name, path)),
    }
}
