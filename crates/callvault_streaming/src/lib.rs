//! Streaming session control for chat about recorded calls.
//!
//! A chat send either streams back a full answer or fails. Failures fall in
//! three buckets:
//!
//! - **Rate limited** ([`is_rate_limit_error`]): wait out a cooldown whose
//!   length comes from [`extract_retry_after_seconds`].
//! - **Interrupted** ([`is_streaming_interruption_error`]): reconnect and
//!   resubmit the last user message, at most `MAX_RECONNECT_ATTEMPTS` times.
//! - **Anything else**: fatal for the current send.
//!
//! [`StreamingSession`] holds the per-chat state a UI renders from
//! (cooldown, reconnect progress, incomplete messages). [`ChatRecovery`]
//! drives a transport through the reconnect protocol against that state.
//! [`ThrottledErrorLog`] keeps a tight retry loop from flooding the logs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod events;
mod log_sink;
mod recovery;
mod retry_after;
mod session;
mod subject;
mod throttled_log;

pub use callvault_core::limits::{
    BASE_RECONNECT_DELAY_MS, DEFAULT_RETRY_AFTER_SECS, ERROR_LOG_INTERVAL_MS,
    MAX_RECONNECT_ATTEMPTS, MAX_RETRY_AFTER_SECS,
};
pub use classify::{is_rate_limit_error, is_streaming_interruption_error};
pub use events::SessionEvent;
pub use log_sink::{LogLevel, LogSink, TracingSink};
pub use recovery::{ChatRecovery, ChatTransport, RecoveryOutcome, backoff_delay};
pub use retry_after::{extract_retry_after_seconds, extract_retry_after_seconds_within};
pub use session::{ErrorDisposition, StreamingSession, trailing_assistant_id};
pub use subject::ErrorSubject;
pub use throttled_log::{ThrottledErrorLog, throttled_error_log};
