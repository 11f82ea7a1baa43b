//! Change notifications emitted by a streaming session.

/// A state change observers of a [`StreamingSession`](crate::StreamingSession) may render.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionEvent {
    /// A cooldown began.
    RateLimitStarted {
        /// Cooldown end in milliseconds since the Unix epoch
        end_ms: u64,
        /// Seconds shown to the user
        seconds: u64,
    },
    /// An active cooldown was cleared.
    RateLimitEnded,
    /// The reconnecting flag was raised.
    ReconnectStarted,
    /// A reconnect attempt was counted.
    ReconnectAttempt {
        /// One-based attempt number
        attempt: u32,
    },
    /// Reconnection state was reset.
    ReconnectionReset,
    /// The set of incomplete message ids changed.
    IncompleteMessagesChanged {
        /// Size of the new set
        count: usize,
    },
}
