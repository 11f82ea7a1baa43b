//! Shared sliding-window-with-reset throttler.
//!
//! For a given scope, at most `max_requests` admissions happen between a
//! window's start and its expiry. Callers over the limit sleep until the
//! window is due to roll over (plus jitter so waiters do not wake in
//! lockstep), then re-evaluate from scratch: another waiter may have taken
//! the fresh window first.

use crate::{RateWindow, Scope};
use callvault_core::{SharedClock, ThrottleConfig, TokioClock};
use callvault_error::{ThrottleError, ThrottleErrorKind};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};

/// Process-wide throttler shared by every outbound caller.
///
/// Cloning is cheap and every clone sees the same per-scope windows. Build
/// one per process and hand it to whatever issues requests.
///
/// # Design
///
/// - **Scope-keyed**: each scope string owns an independent window
/// - **Self-cleaning**: scopes idle for more than two windows are dropped
/// - **Jittered**: waits add `0..jitter_ms` so waiters spread out
/// - **Cooperative**: the map lock is only held between reads and write-backs,
///   never across a sleep
///
/// # Example
///
/// ```no_run
/// use callvault_core::ThrottleConfig;
/// use callvault_rate_limit::{Scope, SharedThrottle};
///
/// # #[tokio::main]
/// # async fn main() {
/// let throttle = SharedThrottle::new(ThrottleConfig::new(90, 1_000, 100));
/// throttle.throttle(Scope::global()).await;
/// // ... issue request ...
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SharedThrottle {
    windows: Arc<Mutex<HashMap<String, RateWindow>>>,
    config: ThrottleConfig,
    clock: SharedClock,
}

impl SharedThrottle {
    /// Create a throttler with the given default limits.
    pub fn new(config: ThrottleConfig) -> Self {
        Self::with_clock(config, TokioClock::shared())
    }

    /// Create a throttler reading time from `clock`.
    pub fn with_clock(config: ThrottleConfig, clock: SharedClock) -> Self {
        debug!(
            max_requests = config.max_requests,
            window_ms = config.window_ms,
            jitter_ms = config.jitter_ms,
            "Creating shared throttle"
        );
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            config,
            clock,
        }
    }

    /// Default limits applied by [`throttle`](Self::throttle).
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Wait until `scope` admits one more request under the default limits.
    pub async fn throttle(&self, scope: impl AsRef<str>) {
        self.throttle_with(scope, self.config.max_requests, self.config.window_ms)
            .await
    }

    /// Wait until `scope` admits one more request under explicit limits.
    ///
    /// Never fails; under sustained overload it keeps waiting.
    pub async fn throttle_with(&self, scope: impl AsRef<str>, max_requests: u32, window_ms: u64) {
        // Without a wait budget admission cannot fail.
        let _ = self
            .admit(scope.as_ref(), max_requests, window_ms, None)
            .await;
    }

    /// Like [`throttle`](Self::throttle), but gives up once the cumulative
    /// wait would exceed the configured `max_wait_ms`.
    ///
    /// Without a configured budget this behaves exactly like `throttle`.
    ///
    /// # Errors
    ///
    /// Returns `WaitExceeded` if admission would take longer than the budget.
    pub async fn throttle_within(&self, scope: impl AsRef<str>) -> Result<(), ThrottleError> {
        self.admit(
            scope.as_ref(),
            self.config.max_requests,
            self.config.window_ms,
            self.config.max_wait_ms,
        )
        .await
    }

    /// Pass every scope in order, e.g. `global` then `user:<id>`.
    pub async fn throttle_scopes(&self, scopes: &[Scope]) {
        for scope in scopes {
            self.throttle(scope).await;
        }
    }

    /// Snapshot of a scope's current window.
    pub async fn window(&self, scope: impl AsRef<str>) -> Option<RateWindow> {
        self.windows.lock().await.get(scope.as_ref()).copied()
    }

    /// Number of scopes currently tracked.
    pub async fn scope_count(&self) -> usize {
        self.windows.lock().await.len()
    }

    /// Drop every scope idle for more than two of its own windows.
    ///
    /// A scope admitted through [`throttle_with`](Self::throttle_with) keeps
    /// the window length it was admitted under, so a long window is never
    /// swept while it still limits admissions.
    ///
    /// Returns the number of scopes removed.
    pub async fn cleanup_stale(&self) -> usize {
        let now = self.clock.now_ms();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| !window.is_stale(now));
        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, remaining = windows.len(), "Cleaned up stale throttle windows");
        }
        removed
    }

    #[instrument(skip(self), fields(waited_ms = tracing::field::Empty))]
    async fn admit(
        &self,
        scope: &str,
        max_requests: u32,
        window_ms: u64,
        max_wait_ms: Option<u64>,
    ) -> Result<(), ThrottleError> {
        let max_requests = max_requests.max(1);
        let window_ms = window_ms.max(1);
        let mut waited_ms: u64 = 0;

        loop {
            let wait_ms = {
                let mut windows = self.windows.lock().await;
                let now = self.clock.now_ms();
                let mut window = windows
                    .get(scope)
                    .copied()
                    .unwrap_or_else(|| RateWindow::starting_at(now, window_ms));
                let elapsed = window.elapsed_ms(now);

                if window.is_stale(now) {
                    windows.remove(scope);
                    debug!(scope, elapsed, "Dropped stale throttle window");
                    continue;
                }

                if elapsed >= window_ms {
                    window = RateWindow::starting_at(now, window_ms);
                }

                if window.count < max_requests {
                    window.count += 1;
                    window.window_ms = window_ms;
                    windows.insert(scope.to_string(), window);
                    trace!(scope, count = window.count, max_requests, "Request admitted");
                    tracing::Span::current().record("waited_ms", waited_ms);
                    return Ok(());
                }

                window_ms - elapsed + self.jitter()
            };

            if let Some(max_wait_ms) = max_wait_ms
                && waited_ms + wait_ms > max_wait_ms
            {
                debug!(scope, waited_ms, wait_ms, max_wait_ms, "Wait budget exhausted");
                return Err(ThrottleError::new(ThrottleErrorKind::WaitExceeded {
                    scope: scope.to_string(),
                    max_wait_ms,
                }));
            }

            debug!(scope, wait_ms, "Rate limit prevention: waiting");
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            waited_ms += wait_ms;
        }
    }

    fn jitter(&self) -> u64 {
        if self.config.jitter_ms == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..self.config.jitter_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callvault_core::Clock;

    fn throttle_at_zero(max_requests: u32, window_ms: u64) -> (SharedThrottle, Arc<TokioClock>) {
        let clock = Arc::new(TokioClock::starting_at(0));
        let throttle = SharedThrottle::with_clock(
            ThrottleConfig::new(max_requests, window_ms, 0),
            clock.clone(),
        );
        (throttle, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_admits_up_to_limit_without_waiting() {
        let (throttle, clock) = throttle_at_zero(5, 1_000);

        for i in 0..5 {
            throttle.throttle("test").await;
            assert_eq!(throttle.window("test").await.unwrap().count, i + 1);
        }

        assert_eq!(clock.now_ms(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_rollover_when_full() {
        let (throttle, clock) = throttle_at_zero(2, 1_000);

        throttle.throttle("test").await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        throttle.throttle("test").await;

        throttle.throttle("test").await;

        assert!(clock.now_ms() >= 1_000);
        let window = throttle.window("test").await.unwrap();
        assert_eq!(window.count, 1);
        assert_eq!(window.window_start_ms, clock.now_ms());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_window_is_replaced() {
        let (throttle, _clock) = throttle_at_zero(3, 100);

        for _ in 0..3 {
            throttle.throttle("quiet").await;
        }
        tokio::time::sleep(Duration::from_millis(201)).await;

        throttle.throttle("quiet").await;
        let window = throttle.window("quiet").await.unwrap();
        assert_eq!(window.count, 1);
        assert_eq!(window.window_start_ms, 201);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_limit_is_treated_as_one() {
        let (throttle, clock) = throttle_at_zero(0, 500);

        throttle.throttle_with("test", 0, 500).await;
        assert_eq!(clock.now_ms(), 0);
        throttle.throttle_with("test", 0, 500).await;
        assert!(clock.now_ms() >= 500);
    }

    #[test]
    fn test_jitter_stays_below_bound() {
        let throttle = SharedThrottle::with_clock(
            ThrottleConfig::new(1, 1_000, 50),
            Arc::new(callvault_core::ManualClock::new(0)),
        );
        for _ in 0..200 {
            assert!(throttle.jitter() < 50);
        }
    }
}
