//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the callvault binary.

mod classify;
mod commands;
mod sync;
mod throttle;

pub use classify::classify;
pub use commands::{Cli, Commands};
pub use sync::run_sync;
pub use throttle::run_throttle;

use callvault::{CallVaultConfig, CallVaultResult, JsonError};
use serde::Serialize;
use std::path::Path;

/// Load configuration from `path`, or from the default locations.
pub fn load_config(path: Option<&Path>) -> CallVaultResult<CallVaultConfig> {
    match path {
        Some(path) => CallVaultConfig::from_file(path),
        None => CallVaultConfig::load(),
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CallVaultResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| JsonError::new(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}
