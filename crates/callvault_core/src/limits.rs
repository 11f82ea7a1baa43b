//! Contract constants shared by the throttler and the streaming controller.
//!
//! These values are observable behaviour; configuration may override the
//! throttle and streaming settings but the constants themselves do not change.

/// Default admissions per window for the shared request throttler.
pub const RATE_MAX_REQUESTS: u32 = 55;

/// Default admission window in milliseconds.
pub const RATE_WINDOW_MS: u64 = 60_000;

/// Upper bound (exclusive) of the random delay added to each throttled wait.
pub const RATE_JITTER_MS: u64 = 200;

/// Reconnect attempts allowed before a stream interruption becomes terminal.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Base reconnect delay; attempt `n` (one-based) waits
/// `BASE_RECONNECT_DELAY_MS * 2^(n-1)`.
pub const BASE_RECONNECT_DELAY_MS: u64 = 1_000;

/// Minimum spacing between two error log lines sharing a key.
pub const ERROR_LOG_INTERVAL_MS: u64 = 5_000;

/// Cooldown applied when a rate-limit error carries no usable retry hint.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Largest retry hint accepted from an error message.
pub const MAX_RETRY_AFTER_SECS: u64 = 300;
