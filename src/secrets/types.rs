//! Credential wrapper.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A Vault API token.
///
/// Formats as `[REDACTED]` and is zeroed on drop. The raw value is only reachable
/// through [`SecretString::expose_secret`], which the HTTP backend calls when it
/// sets the token header.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw token. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_never_shows_token() {
        let token = SecretString::from("hvs.super-secret".to_string());
        assert_eq!(format!("{:?}", token), "SecretString([REDACTED])");
        assert_eq!(token.to_string(), "[REDACTED]");
        assert_eq!(token.expose_secret(), "hvs.super-secret");
    }
}
