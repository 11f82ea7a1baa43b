//! Wall-clock time sources.
//!
//! Rate windows and cooldowns are defined in milliseconds since the Unix
//! epoch. Components take a [`SharedClock`] so tests can substitute a
//! controllable source.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

/// A source of wall-clock milliseconds since the Unix epoch.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Clock handle shared between components.
pub type SharedClock = Arc<dyn Clock>;

/// The operating system's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Wrap the system clock in a shareable handle.
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Wall clock driven by the Tokio timer.
///
/// Reads the system time once at construction and advances with
/// `tokio::time::Instant` afterwards. Under a paused Tokio runtime the clock
/// moves exactly as far as the runtime's sleeps do, which keeps
/// window arithmetic deterministic in tests.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    epoch_ms: u64,
    anchor: tokio::time::Instant,
}

impl TokioClock {
    /// Anchor a new clock at the current system time.
    pub fn new() -> Self {
        Self::starting_at(SystemClock.now_ms())
    }

    /// Anchor a new clock at an explicit epoch offset.
    pub fn starting_at(epoch_ms: u64) -> Self {
        Self {
            epoch_ms,
            anchor: tokio::time::Instant::now(),
        }
    }

    /// Wrap a freshly anchored clock in a shareable handle.
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> u64 {
        self.epoch_ms + self.anchor.elapsed().as_millis() as u64
    }
}

/// A clock that only moves when told to.
///
/// # Examples
///
/// ```
/// use callvault_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1_500);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Start the clock at `now_ms`.
    pub fn new(now_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(now_ms),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now_ms: u64) {
        trace!(now_ms, "Manual clock set");
        self.now.store(now_ms, Ordering::SeqCst);
    }

    /// Move forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        let now = self.now.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms;
        trace!(now_ms = now, delta_ms, "Manual clock advanced");
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
