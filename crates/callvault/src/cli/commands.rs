//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CallVault - request throttling and chat streaming recovery
#[derive(Parser, Debug)]
#[command(name = "callvault")]
#[command(about = "Request throttling, chat streaming recovery and meeting sync", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify an error message the way the chat session would
    Classify {
        /// Error message text
        message: String,

        /// Error name, e.g. AbortError
        #[arg(long)]
        name: Option<String>,
    },

    /// Push requests through the shared throttle and report the waits
    Throttle {
        /// Scope to admit against
        #[arg(long, default_value = "global")]
        scope: String,

        /// Number of requests to admit
        #[arg(long, default_value = "10")]
        requests: u32,

        /// Throttle profile from configuration
        #[arg(long)]
        profile: Option<String>,
    },

    /// List a user's meeting recordings under the shared throttle
    Sync {
        /// API root, e.g. https://api.zoom.us/v2
        #[arg(long)]
        base_url: String,

        /// User whose per-user scope is throttled
        #[arg(long)]
        user: String,

        /// First day to list (YYYY-MM-DD), defaults to 30 days ago
        #[arg(long)]
        from: Option<chrono::NaiveDate>,

        /// Last day to list (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<chrono::NaiveDate>,

        /// Throttle profile from configuration
        #[arg(long, default_value = "zoom")]
        profile: String,
    },
}
