//! Request path resolution for KV secrets.

use super::revision::SchemaRevision;
use crate::errors::Result;

/// Build the API request path for a secret.
///
/// - `V1` -> `<engine_name>/<sub_path>`
/// - `V2` -> `<engine_name>/data/<sub_path>`
///
/// Both parts are joined verbatim.
pub fn resolve_secret_path(revision: SchemaRevision, engine_name: &str, sub_path: &str) -> String {
    revision.secret_path(engine_name, sub_path)
}

/// Like [`resolve_secret_path`] for a revision given by name (`kv1`, `kv-v2`, ...).
///
/// # Errors
///
/// - [`crate::errors::SecretsError::UnsupportedSchemaRevision`] naming `revision`
///   when it is not a known engine type
pub fn resolve_secret_path_str(revision: &str, engine_name: &str, sub_path: &str) -> Result<String> {
    let revision: SchemaRevision = revision.parse()?;
    Ok(resolve_secret_path(revision, engine_name, sub_path))
}
