//! CallVault CLI binary.
//!
//! This binary provides command-line access to CallVault's functionality:
//! - Classify error messages the way a chat session would
//! - Exercise the shared throttle against a configured profile
//! - List meeting recordings under the shared throttle

use callvault::{ObservabilityConfig, init_tracing};
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, classify, load_config, print_json, run_sync, run_throttle};

    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    init_tracing(
        ObservabilityConfig::new("callvault")
            .with_log_level(log_level)
            .with_json_logs(cli.json_logs),
    )?;

    match cli.command {
        Commands::Classify { message, name } => {
            print_json(&classify(&message, name.as_deref()))?;
        }

        Commands::Throttle {
            scope,
            requests,
            profile,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let admissions = run_throttle(&config, &scope, requests, profile.as_deref()).await?;
            print_json(&admissions)?;
        }

        Commands::Sync {
            base_url,
            user,
            from,
            to,
            profile,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let report = run_sync(&config, &base_url, &user, from, to, &profile).await?;
            print_json(&report)?;
        }
    }

    Ok(())
}
