//! Per-scope admission window.

use serde::{Deserialize, Serialize};

/// One scope's current admission window.
///
/// Created on the first request for a scope, replaced when the window
/// expires, and removed once it has been idle for more than two windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateWindow {
    /// When the current window began, in epoch milliseconds
    pub window_start_ms: u64,
    /// Requests admitted so far in this window
    pub count: u32,
    /// Length of the window this scope was last admitted under
    pub window_ms: u64,
}

impl RateWindow {
    /// An empty window of `window_ms` starting at `now_ms`.
    pub fn starting_at(now_ms: u64, window_ms: u64) -> Self {
        Self {
            window_start_ms: now_ms,
            count: 0,
            window_ms,
        }
    }

    /// Milliseconds since the window began.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.window_start_ms)
    }

    /// True once the window has been idle for more than twice its own length.
    pub fn is_stale(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) > self.window_ms.saturating_mul(2)
    }
}
