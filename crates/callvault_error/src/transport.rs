//! Transport error types.
//!
//! The transport is whatever carries a chat message or an integration request
//! to the remote side. It must surface rate limiting either as an HTTP 429
//! status or as a message the rate-limit classifier recognises, and stream or
//! network interruptions as errors the interruption classifier recognises.

/// Specific transport failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// The server answered 429 or otherwise signalled rate limiting
    #[display("{}", message)]
    RateLimited {
        /// HTTP status code (usually 429)
        status: u16,
        /// Server-provided message, may carry a retry-after hint
        message: String,
    },
    /// Non-success HTTP status that is not rate limiting
    #[display("HTTP {}: {}", status, message)]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// The stream or connection was interrupted mid-flight
    #[display("{}: {}", name, message)]
    Interrupted {
        /// Error name, `AbortError` for user-initiated cancellation
        name: String,
        /// Error message
        message: String,
    },
    /// The request could not be issued at all
    #[display("{}", _0)]
    Request(String),
}

/// Transport error with location tracking.
///
/// # Examples
///
/// ```
/// use callvault_error::{TransportError, TransportErrorKind};
///
/// let err = TransportError::new(TransportErrorKind::Interrupted {
///     name: "AbortError".to_string(),
///     message: "The user aborted a request.".to_string(),
/// });
/// assert_eq!(err.name(), "AbortError");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error: {} at line {} in {}", kind, line, file)]
pub struct TransportError {
    /// The kind of error that occurred
    pub kind: TransportErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TransportError {
    /// Create a new TransportError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TransportErrorKind {
        &self.kind
    }

    /// Error name as the transport reported it.
    ///
    /// Only interruptions carry a name; everything else reports `"Error"`.
    pub fn name(&self) -> &str {
        match &self.kind {
            TransportErrorKind::Interrupted { name, .. } => name,
            _ => "Error",
        }
    }

    /// The raw error message, without location decoration.
    pub fn message(&self) -> String {
        match &self.kind {
            TransportErrorKind::RateLimited { message, .. }
            | TransportErrorKind::Interrupted { message, .. } => message.clone(),
            TransportErrorKind::Status { .. } | TransportErrorKind::Request(_) => {
                self.kind.to_string()
            }
        }
    }

    /// HTTP status, if the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            TransportErrorKind::RateLimited { status, .. }
            | TransportErrorKind::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server answered with HTTP 429.
    pub fn is_too_many_requests(&self) -> bool {
        self.status() == Some(429)
    }
}
