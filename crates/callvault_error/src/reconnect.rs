//! Reconnect error types.

/// Terminal outcomes of a reconnect-and-resubmit loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ReconnectErrorKind {
    /// Every allowed attempt failed with a stream interruption
    #[display("Connection lost after {} reconnect attempts: {}", attempts, last_error)]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Message of the final interruption
        last_error: String,
    },
    /// The session was reset while a reconnect was pending
    #[display("Reconnect cancelled")]
    Cancelled,
    /// There was no retained message to resubmit
    #[display("No message to retry")]
    NothingToRetry,
    /// The failure was neither a rate limit nor an interruption
    #[display("{}", _0)]
    Fatal(String),
}

/// Reconnect error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Reconnect Error: {} at line {} in {}", kind, line, file)]
pub struct ReconnectError {
    kind: ReconnectErrorKind,
    line: u32,
    file: &'static str,
}

impl ReconnectError {
    /// Create a new reconnect error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ReconnectErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ReconnectErrorKind {
        &self.kind
    }
}
