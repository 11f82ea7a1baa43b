//! Rate-limited error logging.
//!
//! A reconnect loop that fails every few hundred milliseconds would bury
//! the logs. Each distinct key logs immediately the first time, then at most
//! once per interval while the condition persists.

use crate::{LogSink, TracingSink};
use callvault_core::limits::ERROR_LOG_INTERVAL_MS;
use callvault_core::{SharedClock, SystemClock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::trace;

static GLOBAL: OnceLock<ThrottledErrorLog> = OnceLock::new();

/// Error logger that emits at most one line per key per interval.
///
/// # Example
///
/// ```
/// use callvault_core::ManualClock;
/// use callvault_streaming::{ThrottledErrorLog, TracingSink};
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new(0));
/// let log = ThrottledErrorLog::new(clock.clone(), Arc::new(TracingSink));
///
/// assert!(log.log("network", "Connection lost", &[]));
/// assert!(!log.log("network", "Connection lost", &[]));
/// clock.advance(5_000);
/// assert!(log.log("network", "Connection lost", &[]));
/// ```
pub struct ThrottledErrorLog {
    last_logged: Mutex<HashMap<String, u64>>,
    interval_ms: u64,
    clock: SharedClock,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for ThrottledErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottledErrorLog")
            .field("interval_ms", &self.interval_ms)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl ThrottledErrorLog {
    /// Create a logger with the standard 5 second interval.
    pub fn new(clock: SharedClock, sink: Arc<dyn LogSink>) -> Self {
        Self::with_interval(ERROR_LOG_INTERVAL_MS, clock, sink)
    }

    /// Create a logger with a custom interval.
    pub fn with_interval(interval_ms: u64, clock: SharedClock, sink: Arc<dyn LogSink>) -> Self {
        Self {
            last_logged: Mutex::new(HashMap::new()),
            interval_ms,
            clock,
            sink,
        }
    }

    /// The process-wide logger backed by `tracing` and the system clock.
    pub fn global() -> &'static ThrottledErrorLog {
        GLOBAL.get_or_init(|| Self::new(SystemClock::shared(), Arc::new(TracingSink)))
    }

    /// Log `message` at error level unless `key` logged within the interval.
    ///
    /// Returns whether a line was emitted.
    pub fn log(&self, key: &str, message: &str, extra: &[&dyn fmt::Display]) -> bool {
        let now = self.clock.now_ms();
        {
            let mut last_logged = self
                .last_logged
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(&last) = last_logged.get(key)
                && now.saturating_sub(last) < self.interval_ms
            {
                trace!(key, "Suppressed repeated error log");
                return false;
            }
            last_logged.insert(key.to_string(), now);
        }

        self.sink.error(message, extra);
        true
    }
}

/// Log through the process-wide [`ThrottledErrorLog`].
///
/// Returns whether a line was emitted.
pub fn throttled_error_log(key: &str, message: &str, extra: &[&dyn fmt::Display]) -> bool {
    ThrottledErrorLog::global().log(key, message, extra)
}
