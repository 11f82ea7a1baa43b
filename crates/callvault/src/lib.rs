//! CallVault - request throttling and chat streaming recovery
//!
//! CallVault keeps two kinds of traffic well behaved: outbound calls to
//! third-party meeting APIs, and the streamed chat answers users read about
//! their recorded calls.
//!
//! # Features
//!
//! - **Shared Throttle**: scope-keyed sliding-window-with-reset admission,
//!   jittered waits and self-cleaning windows
//! - **Streaming Sessions**: rate-limit cooldowns, bounded reconnects with
//!   exponential backoff, incomplete-message tracking
//! - **Error Classification**: rate-limit and interruption detection plus
//!   retry-after parsing
//! - **Meeting Sync**: throttled, paginated recording listing with 429 backoff
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use callvault::{Scope, SharedThrottle, ThrottleConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let throttle = SharedThrottle::new(ThrottleConfig::default());
//!
//!     throttle.throttle_scopes(&[Scope::global(), Scope::user("42")]).await;
//!     // ... issue the request ...
//! }
//! ```
//!
//! # Architecture
//!
//! - `callvault_error` - Error types
//! - `callvault_core` - Clock, configuration, chat messages, tracing setup
//! - `callvault_rate_limit` - The shared throttle
//! - `callvault_streaming` - Streaming session control and classifiers
//! - `callvault_sync` - Meeting recording sync
//!
//! This crate (`callvault`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use callvault_core::{
    CallVaultConfig, ChatMessage, Clock, ManualClock, ObservabilityConfig, Role, SharedClock,
    StreamingConfig, SystemClock, ThrottleConfig, TokioClock, init_tracing, limits,
};
pub use callvault_error::{
    CallVaultError, CallVaultErrorKind, CallVaultResult, ConfigError, JsonError, ReconnectError,
    ReconnectErrorKind, ThrottleError, ThrottleErrorKind, TransportError, TransportErrorKind,
};
pub use callvault_rate_limit::{RateWindow, Scope, SharedThrottle};
pub use callvault_streaming::{
    ChatRecovery, ChatTransport, ErrorDisposition, ErrorSubject, LogLevel, LogSink,
    RecoveryOutcome, SessionEvent, StreamingSession, ThrottledErrorLog, TracingSink,
    backoff_delay, extract_retry_after_seconds, extract_retry_after_seconds_within,
    is_rate_limit_error, is_streaming_interruption_error, throttled_error_log,
    trailing_assistant_id,
};
pub use callvault_sync::{
    DateRange, HttpMeetingsClient, MeetingSummary, MeetingSync, MeetingsClient, PageQuery,
    Recording, RecordingFile, RecordingsPage, SyncReport,
};
