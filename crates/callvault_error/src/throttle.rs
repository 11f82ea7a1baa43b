//! Throttler error types.

/// Specific throttler error conditions.
///
/// Being over the limit is never an error by itself; the throttler waits.
/// These only arise from misconfiguration or an explicit wait budget.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ThrottleErrorKind {
    /// Admission would require waiting longer than the caller allowed
    #[display("Admission for scope '{}' would exceed max wait of {}ms", scope, max_wait_ms)]
    WaitExceeded {
        /// Scope that was saturated
        scope: String,
        /// Wait budget in milliseconds
        max_wait_ms: u64,
    },
    /// Unknown throttle profile name
    #[display("Unknown throttle profile: {}", _0)]
    UnknownProfile(String),
    /// Invalid limiter parameters
    #[display("Invalid throttle configuration: {}", _0)]
    InvalidConfig(String),
}

/// Throttler error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Throttle Error: {} at line {} in {}", kind, line, file)]
pub struct ThrottleError {
    kind: ThrottleErrorKind,
    line: u32,
    file: &'static str,
}

impl ThrottleError {
    /// Create a new throttler error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ThrottleErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ThrottleErrorKind {
        &self.kind
    }
}
