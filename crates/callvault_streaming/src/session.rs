//! Per-chat streaming session state.
//!
//! A [`StreamingSession`] owns everything a chat input needs to render its
//! affordances: the rate-limit cooldown, reconnect progress, the last user
//! message kept for resubmission, and the ids of assistant messages a broken
//! stream left incomplete. It never suspends and never fails; waiting for a
//! cooldown or a backoff delay belongs to whoever owns a timer.
//!
//! Readiness follows from the fields:
//!
//! - **Ready**: not rate limited and not reconnecting.
//! - **Rate limited**: [`StreamingSession::is_rate_limited`] is true. Ends on its
//!   own once the cooldown passes ([`StreamingSession::tick`]) or explicitly via
//!   [`StreamingSession::clear_rate_limit_cooldown`].
//! - **Reconnecting**: raised and lowered by the caller around its retry loop.

use crate::{
    ErrorSubject, SessionEvent, ThrottledErrorLog, TracingSink, extract_retry_after_seconds_within,
    is_rate_limit_error, is_streaming_interruption_error,
};
use callvault_core::{ChatMessage, Role, SharedClock, StreamingConfig, SystemClock};
use callvault_error::{TransportError, TransportErrorKind};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

type Listener = Box<dyn Fn(&SessionEvent) + Send>;
type RateLimitEndCallback = Box<dyn FnMut() + Send>;

/// How the session reacted to a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorDisposition {
    /// The same error object was already handled.
    AlreadyHandled,
    /// A cooldown started; the caller should wait it out.
    #[strum(to_string = "Cooldown({seconds}s)")]
    Cooldown {
        /// Cooldown length in seconds
        seconds: u64,
    },
    /// The stream broke; the caller may reconnect and resubmit.
    Reconnect,
    /// Nothing this session can recover from.
    Fatal,
}

/// State of one chat surface's send/stream interaction.
///
/// # Example
///
/// ```
/// use callvault_core::ManualClock;
/// use callvault_streaming::StreamingSession;
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new(1_000_000));
/// let mut session = StreamingSession::with_clock(clock.clone());
///
/// session.set_rate_limit_cooldown(1_030_000, 30);
/// assert!(session.is_rate_limited());
///
/// clock.advance(30_000);
/// assert!(!session.is_rate_limited());
/// ```
pub struct StreamingSession {
    config: StreamingConfig,
    clock: SharedClock,
    error_log: Arc<ThrottledErrorLog>,
    rate_limit_cooldown_end: Option<u64>,
    rate_limit_seconds: u64,
    reconnect_attempts: u32,
    reconnect_attempt_display: u32,
    is_reconnecting: bool,
    last_user_message: Option<String>,
    incomplete_message_ids: HashSet<String>,
    handled_error: Option<Arc<TransportError>>,
    on_rate_limit_end: Option<RateLimitEndCallback>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for StreamingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingSession")
            .field("rate_limit_cooldown_end", &self.rate_limit_cooldown_end)
            .field("rate_limit_seconds", &self.rate_limit_seconds)
            .field("reconnect_attempts", &self.reconnect_attempts)
            .field("is_reconnecting", &self.is_reconnecting)
            .field("last_user_message", &self.last_user_message)
            .field("incomplete_message_ids", &self.incomplete_message_ids)
            .field("handled_error", &self.handled_error)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for StreamingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingSession {
    /// Create a session on the system clock with default settings.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::shared())
    }

    /// Create a session on the given clock with default settings.
    pub fn with_clock(clock: SharedClock) -> Self {
        Self::with_config(StreamingConfig::default(), clock)
    }

    /// Create a session with explicit settings.
    pub fn with_config(config: StreamingConfig, clock: SharedClock) -> Self {
        let error_log = Arc::new(ThrottledErrorLog::with_interval(
            config.error_log_interval_ms,
            clock.clone(),
            Arc::new(TracingSink),
        ));
        Self {
            config,
            clock,
            error_log,
            rate_limit_cooldown_end: None,
            rate_limit_seconds: 0,
            reconnect_attempts: 0,
            reconnect_attempt_display: 0,
            is_reconnecting: false,
            last_user_message: None,
            incomplete_message_ids: HashSet::new(),
            handled_error: None,
            on_rate_limit_end: None,
            listeners: Vec::new(),
        }
    }

    /// Route error logging through a specific throttled logger.
    pub fn with_error_log(mut self, error_log: Arc<ThrottledErrorLog>) -> Self {
        self.error_log = error_log;
        self
    }

    /// Settings this session was built with.
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Current wall-clock time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Register the callback fired once each time an active cooldown is cleared.
    pub fn on_rate_limit_end(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_rate_limit_end = Some(Box::new(callback));
    }

    /// Register an observer for state changes.
    pub fn subscribe(&mut self, listener: impl Fn(&SessionEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&self, event: SessionEvent) {
        debug!(%event, "Session event");
        for listener in &self.listeners {
            listener(&event);
        }
    }

    // ---- Rate-limit cooldown ----

    /// True while the cooldown end lies in the future.
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limit_cooldown_end
            .is_some_and(|end| end > self.clock.now_ms())
    }

    /// Cooldown end in milliseconds since the Unix epoch.
    pub fn rate_limit_cooldown_end(&self) -> Option<u64> {
        self.rate_limit_cooldown_end
    }

    /// Seconds shown to the user, as of the last set or [`tick`](Self::tick).
    pub fn rate_limit_seconds(&self) -> u64 {
        self.rate_limit_seconds
    }

    /// Enter the rate-limited state until `end_ms`.
    #[instrument(skip(self))]
    pub fn set_rate_limit_cooldown(&mut self, end_ms: u64, seconds: u64) {
        self.rate_limit_cooldown_end = Some(end_ms);
        self.rate_limit_seconds = seconds;
        self.emit(SessionEvent::RateLimitStarted { end_ms, seconds });
    }

    /// Leave the rate-limited state.
    ///
    /// Fires `on_rate_limit_end` only when a cooldown was actually set, so
    /// clearing twice notifies once. Returns whether anything was cleared.
    pub fn clear_rate_limit_cooldown(&mut self) -> bool {
        if self.rate_limit_cooldown_end.take().is_none() {
            return false;
        }
        self.rate_limit_seconds = 0;
        if let Some(callback) = self.on_rate_limit_end.as_mut() {
            callback();
        }
        self.emit(SessionEvent::RateLimitEnded);
        true
    }

    /// Whole seconds left in the cooldown, rounded up.
    pub fn remaining_cooldown_secs(&self) -> u64 {
        self.rate_limit_cooldown_end
            .map(|end| end.saturating_sub(self.clock.now_ms()).div_ceil(1_000))
            .unwrap_or(0)
    }

    /// Refresh the displayed countdown and clear the cooldown once it has run out.
    ///
    /// Meant to be called about once a second while a cooldown is active.
    /// Returns the seconds remaining.
    pub fn tick(&mut self) -> u64 {
        if self.rate_limit_cooldown_end.is_none() {
            return 0;
        }
        let remaining = self.remaining_cooldown_secs();
        self.rate_limit_seconds = remaining;
        if remaining == 0 {
            self.clear_rate_limit_cooldown();
        }
        remaining
    }

    // ---- Reconnection ----

    /// Authoritative reconnect attempt counter.
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Attempt number shown to the user ("attempt N of 3").
    pub fn reconnect_attempt_display(&self) -> u32 {
        self.reconnect_attempt_display
    }

    /// Whether a reconnect loop is in progress.
    pub fn is_reconnecting(&self) -> bool {
        self.is_reconnecting
    }

    /// Raise or lower the reconnecting flag.
    pub fn set_reconnecting(&mut self, reconnecting: bool) {
        let started = reconnecting && !self.is_reconnecting;
        self.is_reconnecting = reconnecting;
        if started {
            self.emit(SessionEvent::ReconnectStarted);
        }
    }

    /// Count one more reconnect attempt.
    ///
    /// Returns the one-based attempt number, or `None` once the configured
    /// maximum has been used up. The counter never passes the maximum.
    pub fn begin_reconnect_attempt(&mut self) -> Option<u32> {
        if self.reconnect_attempts >= self.config.max_reconnect_attempts {
            warn!(
                attempts = self.reconnect_attempts,
                "Reconnect attempts exhausted"
            );
            return None;
        }
        self.reconnect_attempts += 1;
        self.reconnect_attempt_display = self.reconnect_attempts;
        let attempt = self.reconnect_attempts;
        self.emit(SessionEvent::ReconnectAttempt { attempt });
        Some(attempt)
    }

    /// Text of the most recent outbound message.
    pub fn last_user_message(&self) -> Option<&str> {
        self.last_user_message.as_deref()
    }

    /// Remember the outbound message so a reconnect can resubmit it.
    pub fn set_last_user_message(&mut self, message: impl Into<String>) {
        self.last_user_message = Some(message.into());
    }

    /// Clear every reconnection-related field at once.
    ///
    /// Attempts, display counter, reconnecting flag, last user message,
    /// incomplete ids and the handled error all return to empty. A retry loop
    /// observing `is_reconnecting() == false` afterwards stops.
    #[instrument(skip(self))]
    pub fn reset_reconnection_state(&mut self) {
        self.reconnect_attempts = 0;
        self.reconnect_attempt_display = 0;
        self.is_reconnecting = false;
        self.last_user_message = None;
        self.incomplete_message_ids.clear();
        self.handled_error = None;
        self.emit(SessionEvent::ReconnectionReset);
    }

    // ---- Incomplete messages ----

    /// Ids of assistant messages a broken stream left unfinished.
    pub fn incomplete_message_ids(&self) -> &HashSet<String> {
        &self.incomplete_message_ids
    }

    /// Replace the whole set of incomplete ids.
    pub fn set_incomplete_message_ids(&mut self, ids: HashSet<String>) {
        self.incomplete_message_ids = ids;
        self.emit(SessionEvent::IncompleteMessagesChanged {
            count: self.incomplete_message_ids.len(),
        });
    }

    /// Add one id to the incomplete set.
    pub fn mark_incomplete(&mut self, id: impl Into<String>) {
        let mut ids = self.incomplete_message_ids.clone();
        if ids.insert(id.into()) {
            self.set_incomplete_message_ids(ids);
        }
    }

    /// Whether a message is flagged incomplete.
    pub fn is_incomplete(&self, id: &str) -> bool {
        self.incomplete_message_ids.contains(id)
    }

    /// The incomplete set after an interruption of `messages`.
    ///
    /// The current set plus the trailing assistant message, if the
    /// conversation ends on one.
    pub fn incomplete_ids_for_interruption(&self, messages: &[ChatMessage]) -> HashSet<String> {
        let mut ids = self.incomplete_message_ids.clone();
        if let Some(id) = trailing_assistant_id(messages) {
            ids.insert(id.to_string());
        }
        ids
    }

    /// `messages` without the ones flagged incomplete, ready for a resubmit.
    pub fn retain_complete(&self, messages: &[ChatMessage]) -> Vec<ChatMessage> {
        messages
            .iter()
            .filter(|message| !self.is_incomplete(&message.id))
            .cloned()
            .collect()
    }

    // ---- Error handling ----

    /// The error object last reacted to.
    pub fn handled_error(&self) -> Option<&Arc<TransportError>> {
        self.handled_error.as_ref()
    }

    /// Record `error` as handled.
    ///
    /// Returns `false` when this same error object (by identity, not by
    /// value) was already the handled one.
    pub fn mark_handled(&mut self, error: &Arc<TransportError>) -> bool {
        if let Some(handled) = &self.handled_error
            && Arc::ptr_eq(handled, error)
        {
            return false;
        }
        self.handled_error = Some(Arc::clone(error));
        true
    }

    /// Forget the handled error, e.g. once the transport reports no error.
    pub fn clear_handled_error(&mut self) {
        self.handled_error = None;
    }

    /// React to a transport failure.
    ///
    /// Each error object is handled once. Rate limiting starts a cooldown
    /// sized from the error's retry hint and drops any reconnect in progress.
    /// An interruption with a message to resubmit flags the trailing
    /// assistant message and asks for a reconnect. Anything else is fatal,
    /// and a trailing assistant message that already has text is flagged.
    #[instrument(skip(self, error, messages), fields(error = %error.message()))]
    pub fn handle_error(
        &mut self,
        error: &Arc<TransportError>,
        messages: &[ChatMessage],
    ) -> ErrorDisposition {
        if !self.mark_handled(error) {
            return ErrorDisposition::AlreadyHandled;
        }

        let message = error.message();
        self.error_log
            .log("general", "Chat error occurred", &[&message]);

        if signals_rate_limit(error) {
            let seconds = extract_retry_after_seconds_within(
                &**error,
                self.config.default_retry_after_secs,
                self.config.max_retry_after_secs,
            );
            let end_ms = self.clock.now_ms() + seconds * 1_000;
            self.set_rate_limit_cooldown(end_ms, seconds);
            self.reset_reconnection_state();
            self.handled_error = Some(Arc::clone(error));
            return ErrorDisposition::Cooldown { seconds };
        }

        if is_streaming_interruption_error(&**error) && self.last_user_message.is_some() {
            let ids = self.incomplete_ids_for_interruption(messages);
            if ids.len() != self.incomplete_message_ids.len() {
                self.set_incomplete_message_ids(ids);
            }
            return ErrorDisposition::Reconnect;
        }

        if let Some(last) = messages.last()
            && last.role == Role::Assistant
            && !last.is_blank()
        {
            self.mark_incomplete(last.id.clone());
        }
        ErrorDisposition::Fatal
    }
}

/// Whether a transport error means the server is rate limiting us.
pub(crate) fn signals_rate_limit(error: &TransportError) -> bool {
    matches!(error.kind(), TransportErrorKind::RateLimited { .. })
        || error.is_too_many_requests()
        || is_rate_limit_error(ErrorSubject::from(error))
}

/// Id of the last message when it is an assistant message.
pub fn trailing_assistant_id(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .last()
        .filter(|message| message.role == Role::Assistant)
        .map(|message| message.id.as_str())
}
