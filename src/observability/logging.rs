//! # Structured Logging
//!
//! `tracing-subscriber` fmt output filtered by `RUST_LOG`, human readable by
//! default or JSON for log shippers. Logs go to stderr so stdout stays free for
//! secret values printed by the CLI.

use tracing_subscriber::{fmt, EnvFilter};

/// Logging options.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Default to `debug` instead of `info` when `RUST_LOG` is unset
    pub verbose: bool,
    /// Emit one JSON object per event
    pub json: bool,
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Install the global subscriber.
///
/// Does nothing if a subscriber is already installed (e.g. by a test harness).
pub fn init_logging(config: &LoggingConfig) {
    let builder = fmt().with_env_filter(config.env_filter()).with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if installed.is_err() {
        // Subscriber already set elsewhere; keep it.
    }
}
