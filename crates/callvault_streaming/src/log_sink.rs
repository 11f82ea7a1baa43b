//! Logger collaborator.

use std::fmt;

/// Severity of a log line.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    /// Verbose diagnostics
    Debug,
    /// Normal operation
    Info,
    /// Something unexpected but recoverable
    Warn,
    /// A failure
    Error,
}

/// Where log lines go.
///
/// The first argument is always a human-readable message; `extra` carries
/// any additional context the caller attached.
pub trait LogSink: Send + Sync {
    /// Emit one line.
    fn log(&self, level: LogLevel, message: &str, extra: &[&dyn fmt::Display]);

    /// Emit an error line.
    fn error(&self, message: &str, extra: &[&dyn fmt::Display]) {
        self.log(LogLevel::Error, message, extra);
    }

    /// Emit a warning line.
    fn warn(&self, message: &str, extra: &[&dyn fmt::Display]) {
        self.log(LogLevel::Warn, message, extra);
    }

    /// Emit an informational line.
    fn info(&self, message: &str, extra: &[&dyn fmt::Display]) {
        self.log(LogLevel::Info, message, extra);
    }

    /// Emit a debug line.
    fn debug(&self, message: &str, extra: &[&dyn fmt::Display]) {
        self.log(LogLevel::Debug, message, extra);
    }
}

/// Sink that forwards to `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str, extra: &[&dyn fmt::Display]) {
        let extra = join(extra);
        match level {
            LogLevel::Debug => tracing::debug!(extra = %extra, "{}", message),
            LogLevel::Info => tracing::info!(extra = %extra, "{}", message),
            LogLevel::Warn => tracing::warn!(extra = %extra, "{}", message),
            LogLevel::Error => tracing::error!(extra = %extra, "{}", message),
        }
    }
}

fn join(extra: &[&dyn fmt::Display]) -> String {
    extra
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
