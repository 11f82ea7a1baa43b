//! Reconnect-and-resubmit driver.

use crate::{ErrorDisposition, StreamingSession};
use async_trait::async_trait;
use callvault_core::ChatMessage;
use callvault_error::{ReconnectError, ReconnectErrorKind, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Carries one chat message to the model and collects the streamed answer.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `message` and return the full response text.
    ///
    /// Rate limiting must surface as HTTP 429 or a message the rate-limit
    /// classifier recognises; broken streams as errors the interruption
    /// classifier recognises.
    async fn send(&self, message: &str) -> Result<String, TransportError>;
}

/// How a send finished without a terminal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The answer streamed through, possibly after reconnecting.
    Completed(String),
    /// The server is rate limiting; the session is cooling down.
    RateLimited {
        /// Cooldown length in seconds
        seconds: u64,
    },
}

/// Delay before reconnect attempt `attempt` (one-based).
///
/// Doubles from `base_ms`: attempt 1 waits `base_ms`, attempt 2 twice that,
/// and so on.
///
/// # Examples
///
/// ```
/// use callvault_streaming::backoff_delay;
/// use std::time::Duration;
///
/// assert_eq!(backoff_delay(1_000, 1), Duration::from_millis(1_000));
/// assert_eq!(backoff_delay(1_000, 3), Duration::from_millis(4_000));
/// ```
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(32);
    Duration::from_millis(base_ms.saturating_mul(1u64 << exponent))
}

/// Drives a [`ChatTransport`] through rate limiting and reconnects.
///
/// State lives in a shared [`StreamingSession`] so a UI can render it while a
/// send is in flight, and cancel a reconnect loop by calling
/// [`StreamingSession::reset_reconnection_state`]. The loop notices on its
/// next check; an in-flight transport call is not aborted.
#[derive(Debug)]
pub struct ChatRecovery<T> {
    transport: T,
    session: Arc<Mutex<StreamingSession>>,
    jitter: bool,
}

impl<T: ChatTransport> ChatRecovery<T> {
    /// Wrap a transport and the session it reports into.
    pub fn new(transport: T, session: Arc<Mutex<StreamingSession>>) -> Self {
        Self {
            transport,
            session,
            jitter: true,
        }
    }

    /// Enable or disable random jitter on backoff delays.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// The shared session.
    pub fn session(&self) -> &Arc<Mutex<StreamingSession>> {
        &self.session
    }

    /// The wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a message, reconnecting after interruptions.
    ///
    /// `history` is the conversation as the caller renders it; it decides
    /// which assistant message an interruption leaves incomplete.
    ///
    /// # Errors
    ///
    /// - `Exhausted` once every reconnect attempt has failed
    /// - `Cancelled` when the reconnect loop was reset from outside
    /// - `Fatal` for errors that are neither rate limiting nor interruptions
    #[instrument(skip(self, message, history), fields(len = message.len()))]
    pub async fn send(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<RecoveryOutcome, ReconnectError> {
        {
            let mut session = self.session.lock().await;
            if session.is_rate_limited() {
                let seconds = session.remaining_cooldown_secs();
                debug!(seconds, "Send blocked by active cooldown");
                return Ok(RecoveryOutcome::RateLimited { seconds });
            }
            // Attempts count per message; a previous failure must not carry over.
            if session.reconnect_attempts() > 0 || session.is_reconnecting() {
                session.reset_reconnection_state();
            }
            session.set_last_user_message(message);
        }

        let mut outbound = message.to_string();
        loop {
            let error = match self.transport.send(&outbound).await {
                Ok(response) => {
                    let mut session = self.session.lock().await;
                    if session.reconnect_attempts() > 0 {
                        info!(
                            attempts = session.reconnect_attempts(),
                            "Connection restored"
                        );
                    }
                    session.reset_reconnection_state();
                    return Ok(RecoveryOutcome::Completed(response));
                }
                Err(error) => Arc::new(error),
            };

            let (attempt, base_ms) = {
                let mut session = self.session.lock().await;
                match session.handle_error(&error, history) {
                    ErrorDisposition::Cooldown { seconds } => {
                        return Ok(RecoveryOutcome::RateLimited { seconds });
                    }
                    ErrorDisposition::Fatal | ErrorDisposition::AlreadyHandled => {
                        session.set_reconnecting(false);
                        return Err(ReconnectError::new(ReconnectErrorKind::Fatal(
                            error.message(),
                        )));
                    }
                    ErrorDisposition::Reconnect => {}
                }

                session.set_reconnecting(true);
                let Some(attempt) = session.begin_reconnect_attempt() else {
                    session.set_reconnecting(false);
                    return Err(ReconnectError::new(ReconnectErrorKind::Exhausted {
                        attempts: session.reconnect_attempts(),
                        last_error: error.message(),
                    }));
                };
                (attempt, session.config().base_reconnect_delay_ms)
            };

            let mut delay = backoff_delay(base_ms, attempt);
            if self.jitter {
                delay = tokio_retry2::strategy::jitter(delay);
            }
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error.message(),
                "Stream interrupted, reconnecting"
            );
            tokio::time::sleep(delay).await;

            let session = self.session.lock().await;
            if !session.is_reconnecting() {
                debug!(attempt, "Reconnect cancelled");
                return Err(ReconnectError::new(ReconnectErrorKind::Cancelled));
            }
            let Some(last) = session.last_user_message() else {
                return Err(ReconnectError::new(ReconnectErrorKind::NothingToRetry));
            };
            outbound = last.to_string();
        }
    }

    /// Resubmit the last user message after a terminal failure.
    ///
    /// Incomplete messages should be dropped from the caller's history
    /// first, see [`StreamingSession::retain_complete`].
    ///
    /// # Errors
    ///
    /// `NothingToRetry` when no message was sent yet, otherwise as [`send`](Self::send).
    pub async fn retry(&self, history: &[ChatMessage]) -> Result<RecoveryOutcome, ReconnectError> {
        let message = {
            let mut session = self.session.lock().await;
            let Some(message) = session.last_user_message().map(str::to_string) else {
                return Err(ReconnectError::new(ReconnectErrorKind::NothingToRetry));
            };
            session.reset_reconnection_state();
            message
        };
        self.send(&message, history).await
    }
}
