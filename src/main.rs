use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use vaultkv::{
    cli::{run, Cli},
    observability::{init_logging, LoggingConfig},
    SecretsError, APP_NAME, VERSION,
};

/// Exit status when the client could not be constructed at all.
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists (optional - won't fail if missing)
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    init_logging(&LoggingConfig { verbose: cli.verbose, json: cli.json_logs });
    tracing::debug!(app_name = APP_NAME, version = VERSION, "Starting");

    match run(&cli).await {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let fatal = e.downcast_ref::<SecretsError>().is_some_and(SecretsError::is_fatal);
            if fatal {
                error!(error = %e, "Vault api client could not be created");
            }
            eprintln!("Error: {:#}", e);
            if fatal {
                ExitCode::from(EXIT_FATAL)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
