//! TOML configuration for throttle profiles and streaming recovery.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from callvault.toml)
//! - User overrides (./callvault.toml or ~/.config/callvault/callvault.toml)
//! - Automatic merging with user values taking precedence

use crate::limits::{
    BASE_RECONNECT_DELAY_MS, DEFAULT_RETRY_AFTER_SECS, ERROR_LOG_INTERVAL_MS,
    MAX_RECONNECT_ATTEMPTS, MAX_RETRY_AFTER_SECS, RATE_JITTER_MS, RATE_MAX_REQUESTS,
    RATE_WINDOW_MS,
};
use callvault_error::{CallVaultResult, ConfigError};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Limits for one throttle profile.
///
/// # Example
///
/// ```toml
/// [throttle.zoom]
/// max_requests = 90
/// window_ms = 1_000
/// jitter_ms = 100
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ThrottleConfig {
    /// Admissions allowed per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Upper bound of the random delay added to each wait
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    /// Longest cumulative wait `throttle_within` tolerates; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_ms: Option<u64>,
}

fn default_max_requests() -> u32 {
    RATE_MAX_REQUESTS
}

fn default_window_ms() -> u64 {
    RATE_WINDOW_MS
}

fn default_jitter_ms() -> u64 {
    RATE_JITTER_MS
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_requests: RATE_MAX_REQUESTS,
            window_ms: RATE_WINDOW_MS,
            jitter_ms: RATE_JITTER_MS,
            max_wait_ms: None,
        }
    }
}

impl ThrottleConfig {
    /// Create a profile without a wait budget.
    pub fn new(max_requests: u32, window_ms: u64, jitter_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
            jitter_ms,
            max_wait_ms: None,
        }
    }

    /// Set the wait budget used by `throttle_within`.
    pub fn with_max_wait_ms(mut self, max_wait_ms: u64) -> Self {
        self.max_wait_ms = Some(max_wait_ms);
        self
    }

    /// Validates the limits.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_requests` or `window_ms` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests == 0 {
            return Err(ConfigError::new("max_requests must be at least 1"));
        }
        if self.window_ms == 0 {
            return Err(ConfigError::new("window_ms must be positive"));
        }
        Ok(())
    }
}

/// Streaming recovery settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct StreamingConfig {
    /// Reconnect attempts before an interruption is terminal
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Base of the exponential reconnect backoff
    #[serde(default = "default_base_reconnect_delay_ms")]
    pub base_reconnect_delay_ms: u64,

    /// Minimum spacing of throttled error log lines per key
    #[serde(default = "default_error_log_interval_ms")]
    pub error_log_interval_ms: u64,

    /// Cooldown used when no retry hint can be parsed
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,

    /// Largest retry hint accepted
    #[serde(default = "default_max_retry_after_secs")]
    pub max_retry_after_secs: u64,
}

fn default_max_reconnect_attempts() -> u32 {
    MAX_RECONNECT_ATTEMPTS
}

fn default_base_reconnect_delay_ms() -> u64 {
    BASE_RECONNECT_DELAY_MS
}

fn default_error_log_interval_ms() -> u64 {
    ERROR_LOG_INTERVAL_MS
}

fn default_retry_after_secs() -> u64 {
    DEFAULT_RETRY_AFTER_SECS
}

fn default_max_retry_after_secs() -> u64 {
    MAX_RETRY_AFTER_SECS
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            base_reconnect_delay_ms: BASE_RECONNECT_DELAY_MS,
            error_log_interval_ms: ERROR_LOG_INTERVAL_MS,
            default_retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
            max_retry_after_secs: MAX_RETRY_AFTER_SECS,
        }
    }
}

/// Top-level CallVault configuration.
///
/// Loads configuration from TOML files with a precedence system:
/// 1. Bundled defaults (include_str! from callvault.toml)
/// 2. User override (~/.config/callvault/callvault.toml)
/// 3. User override (./callvault.toml)
///
/// # Example
///
/// ```no_run
/// use callvault_core::CallVaultConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CallVaultConfig::load()?;
/// let zoom = config.throttle_profile("zoom").unwrap();
/// println!("Zoom admits {} requests per {}ms", zoom.max_requests, zoom.window_ms);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CallVaultConfig {
    /// Map of profile name to throttle limits
    #[serde(default)]
    pub throttle: HashMap<String, ThrottleConfig>,

    /// Streaming recovery settings
    #[serde(default)]
    pub streaming: StreamingConfig,
}

impl CallVaultConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a profile is invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CallVaultResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or a profile is invalid.
    #[instrument]
    pub fn load() -> CallVaultResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../callvault.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/callvault/callvault.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("callvault").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Look up a throttle profile by name.
    #[instrument(skip(self))]
    pub fn throttle_profile(&self, name: &str) -> Option<ThrottleConfig> {
        let profile = self.throttle.get(name).copied();
        debug!(found = profile.is_some(), "Looking up throttle profile");
        profile
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, profile) in &self.throttle {
            profile
                .validate()
                .map_err(|e| ConfigError::new(format!("throttle.{}: {}", name, e.message)))?;
        }
        Ok(())
    }
}
