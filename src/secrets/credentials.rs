//! Vault API token acquisition.
//!
//! The token is obtained through an ordered chain of [`CredentialSource`]s. Each
//! source answers "here is a token", "I have nothing" (`Ok(None)`), or fails hard.
//! The first token wins; if every source comes up empty the chain fails with
//! [`SecretsError::CredentialMissing`].
//!
//! The default chain is:
//!
//! 1. the `VAULT_API_TOKEN` environment variable
//! 2. a token file, only when one is configured (`VAULT_API_TOKEN_FILE`)
//! 3. an interactive terminal prompt with echo disabled
//!
//! Only the name of the source that supplied the token is logged, never the token.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::types::SecretString;
use crate::config::ClientSettings;
use crate::errors::{Result, SecretsError};

/// Prompt printed before reading the token from the terminal.
pub const TOKEN_PROMPT: &str = "Vault api token (silent input): ";

/// One place a Vault API token may come from.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Human readable name used in logs and errors.
    fn describe(&self) -> String;

    /// Try to obtain a token.
    ///
    /// Returns `Ok(None)` when this source has nothing to offer so the next one
    /// can be tried.
    async fn fetch(&self) -> Result<Option<SecretString>>;
}

/// Reads the token from an environment variable. Empty values count as unset.
#[derive(Debug, Clone)]
pub struct EnvVarCredentialSource {
    var_name: String,
}

impl EnvVarCredentialSource {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self { var_name: var_name.into() }
    }
}

#[async_trait]
impl CredentialSource for EnvVarCredentialSource {
    fn describe(&self) -> String {
        format!("env var '{}'", self.var_name)
    }

    async fn fetch(&self) -> Result<Option<SecretString>> {
        Ok(std::env::var(&self.var_name).ok().filter(|v| !v.is_empty()).map(SecretString::from))
    }
}

/// Reads one line from a channel that does not echo input.
pub trait SecretPrompt: Send + Sync {
    /// Print `prompt` and read a line without echoing it. Blocking.
    fn read_hidden_line(&self, prompt: &str) -> std::io::Result<String>;
}

/// [`SecretPrompt`] on the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn read_hidden_line(&self, prompt: &str) -> std::io::Result<String> {
        rpassword::prompt_password(prompt)
    }
}

/// Asks the operator for the token interactively.
///
/// The blocking read runs on tokio's blocking pool. A missing terminal is treated
/// as "no token available" rather than a hard failure.
#[derive(Clone)]
pub struct PromptCredentialSource {
    prompt: Arc<dyn SecretPrompt>,
}

impl PromptCredentialSource {
    pub fn new(prompt: Arc<dyn SecretPrompt>) -> Self {
        Self { prompt }
    }

    pub fn terminal() -> Self {
        Self::new(Arc::new(TerminalPrompt))
    }
}

#[async_trait]
impl CredentialSource for PromptCredentialSource {
    fn describe(&self) -> String {
        "command line input".to_string()
    }

    async fn fetch(&self) -> Result<Option<SecretString>> {
        let prompt = Arc::clone(&self.prompt);
        let line = tokio::task::spawn_blocking(move || prompt.read_hidden_line(TOKEN_PROMPT))
            .await
            .map_err(|e| SecretsError::Io(std::io::Error::other(e)))?;

        match line {
            Ok(line) => {
                let token = line.trim_end_matches(['\r', '\n']);
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::new(token)))
                }
            }
            Err(e) => {
                warn!(error = %e, "Unable to read vault api token from terminal");
                Ok(None)
            }
        }
    }
}

/// Reads the token from a file, e.g. `~/.vault-token`.
///
/// A missing or empty file means "no token available"; other read failures are errors.
#[derive(Debug, Clone)]
pub struct TokenFileCredentialSource {
    path: PathBuf,
}

impl TokenFileCredentialSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialSource for TokenFileCredentialSource {
    fn describe(&self) -> String {
        format!("token file '{}'", self.path.display())
    }

    async fn fetch(&self) -> Result<Option<SecretString>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| SecretString::new(token)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SecretsError::Io(e)),
        }
    }
}

/// Tries credential sources in order until one yields a token.
pub struct CredentialResolver {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialResolver {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// The environment, then the token file (if configured), then the terminal.
    pub fn default_chain(settings: &ClientSettings) -> Self {
        let mut sources: Vec<Box<dyn CredentialSource>> =
            vec![Box::new(EnvVarCredentialSource::new(settings.token_env_var.clone()))];
        if let Some(ref path) = settings.token_file {
            sources.push(Box::new(TokenFileCredentialSource::new(path.clone())));
        }
        sources.push(Box::new(PromptCredentialSource::terminal()));
        Self::new(sources)
    }

    /// Names of the configured sources, in the order they are tried.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.describe()).collect()
    }

    /// Obtain a token from the first source that has one.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::CredentialMissing`] if no source yields a token
    /// - any hard failure reported by a source
    pub async fn resolve(&self) -> Result<SecretString> {
        let mut tried = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let name = source.describe();
            match source.fetch().await {
                Ok(Some(token)) => {
                    info!(source = %name, "Retrieved vault api token from {}", name);
                    return Ok(token);
                }
                Ok(None) => {
                    debug!(source = %name, "No vault api token available from source");
                    tried.push(name);
                }
                Err(e) => {
                    error!(source = %name, error = %e, "Credential source failed");
                    return Err(e);
                }
            }
        }

        error!(tried = ?tried, "No vault api token could be retrieved");
        Err(SecretsError::CredentialMissing { tried })
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver").field("sources", &self.source_names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    /// Prompt answering with a fixed line and counting how often it was asked.
    struct ScriptedPrompt {
        answer: std::io::Result<String>,
        calls: AtomicUsize,
    }

    impl ScriptedPrompt {
        fn answering(line: &str) -> Arc<Self> {
            Arc::new(Self { answer: Ok(line.to_string()), calls: AtomicUsize::new(0) })
        }

        fn without_terminal() -> Arc<Self> {
            Arc::new(Self {
                answer: Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no tty")),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SecretPrompt for ScriptedPrompt {
        fn read_hidden_line(&self, prompt: &str) -> std::io::Result<String> {
            assert_eq!(prompt, TOKEN_PROMPT);
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.answer {
                Ok(line) => Ok(line.clone()),
                Err(e) => Err(std::io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn resolver(env_var: &str, prompt: Arc<ScriptedPrompt>) -> CredentialResolver {
        CredentialResolver::new(vec![
            Box::new(EnvVarCredentialSource::new(env_var)),
            Box::new(PromptCredentialSource::new(prompt)),
        ])
    }

    #[tokio::test]
    #[traced_test]
    async fn test_env_var_wins_over_prompt() {
        let var = "VAULTKV_TEST_TOKEN_ENV_WINS";
        std::env::set_var(var, "hvs.from-env");
        let prompt = ScriptedPrompt::answering("hvs.from-prompt");

        let token = resolver(var, prompt.clone()).resolve().await.unwrap();

        assert_eq!(token.expose_secret(), "hvs.from-env");
        assert_eq!(prompt.calls(), 0);
        assert!(logs_contain("env var 'VAULTKV_TEST_TOKEN_ENV_WINS'"));
        assert!(!logs_contain("hvs.from-env"));

        std::env::remove_var(var);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_prompt_used_when_env_var_unset() {
        let var = "VAULTKV_TEST_TOKEN_UNSET";
        std::env::remove_var(var);
        let prompt = ScriptedPrompt::answering("hvs.typed");

        let token = resolver(var, prompt.clone()).resolve().await.unwrap();

        assert_eq!(token.expose_secret(), "hvs.typed");
        assert_eq!(prompt.calls(), 1);
        assert!(logs_contain("command line input"));
        assert!(!logs_contain("hvs.typed"));
    }

    #[tokio::test]
    async fn test_empty_env_var_falls_through_to_prompt() {
        let var = "VAULTKV_TEST_TOKEN_EMPTY";
        std::env::set_var(var, "");
        let prompt = ScriptedPrompt::answering("hvs.typed");

        let token = resolver(var, prompt.clone()).resolve().await.unwrap();

        assert_eq!(token.expose_secret(), "hvs.typed");
        assert_eq!(prompt.calls(), 1);

        std::env::remove_var(var);
    }

    #[tokio::test]
    async fn test_missing_everywhere_is_credential_missing() {
        let var = "VAULTKV_TEST_TOKEN_NOWHERE";
        std::env::remove_var(var);

        let err = resolver(var, ScriptedPrompt::answering("")).resolve().await.unwrap_err();
        match err {
            SecretsError::CredentialMissing { tried } => {
                assert_eq!(tried, vec![format!("env var '{}'", var), "command line input".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_terminal_counts_as_unavailable() {
        let var = "VAULTKV_TEST_TOKEN_NO_TTY";
        std::env::remove_var(var);

        let err = resolver(var, ScriptedPrompt::without_terminal()).resolve().await.unwrap_err();
        assert!(matches!(err, SecretsError::CredentialMissing { .. }));
    }

    #[tokio::test]
    async fn test_prompt_strips_line_ending() {
        let source = PromptCredentialSource::new(ScriptedPrompt::answering("hvs.typed\r\n"));
        let token = source.fetch().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "hvs.typed");
    }

    #[tokio::test]
    async fn test_token_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".vault-token");

        let source = TokenFileCredentialSource::new(&path);
        assert!(source.fetch().await.unwrap().is_none());

        std::fs::write(&path, "  \n").unwrap();
        assert!(source.fetch().await.unwrap().is_none());

        std::fs::write(&path, "hvs.from-file\n").unwrap();
        let token = source.fetch().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "hvs.from-file");
    }

    #[tokio::test]
    async fn test_token_file_read_failure_is_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a directory as a file fails with something other than NotFound.
        let source = TokenFileCredentialSource::new(dir.path());
        let resolver = CredentialResolver::new(vec![Box::new(source)]);
        assert!(matches!(resolver.resolve().await, Err(SecretsError::Io(_))));
    }

    #[test]
    fn test_default_chain_order() {
        let settings = ClientSettings::default();
        assert_eq!(
            CredentialResolver::default_chain(&settings).source_names(),
            vec!["env var 'VAULT_API_TOKEN'".to_string(), "command line input".to_string()]
        );

        let settings =
            ClientSettings { token_file: Some(PathBuf::from("/tmp/token")), ..Default::default() };
        assert_eq!(
            CredentialResolver::default_chain(&settings).source_names(),
            vec![
                "env var 'VAULT_API_TOKEN'".to_string(),
                "token file '/tmp/token'".to_string(),
                "command line input".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_env_var_wins_over_configured_token_file() {
        let var = "VAULTKV_TEST_TOKEN_OVER_FILE";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".vault-token");
        std::fs::write(&path, "hvs.from-file\n").unwrap();
        let settings = ClientSettings {
            token_env_var: var.to_string(),
            token_file: Some(path),
            ..Default::default()
        };

        std::env::set_var(var, "hvs.from-env");
        let token = CredentialResolver::default_chain(&settings).resolve().await.unwrap();
        assert_eq!(token.expose_secret(), "hvs.from-env");

        std::env::remove_var(var);
        let token = CredentialResolver::default_chain(&settings).resolve().await.unwrap();
        assert_eq!(token.expose_secret(), "hvs.from-file");
    }
}
