//! Failure classifiers.
//!
//! Both classifiers are total: they never panic and answer `false` for input
//! that is neither an error nor a string. Their patterns do not overlap, so
//! a caller can branch on whichever matches.

use crate::ErrorSubject;

const RATE_LIMIT_PATTERNS: &[&str] = &["rate limit", "too many requests", "429"];

const INTERRUPTION_PATTERNS: &[&str] = &[
    "aborted",
    "network error",
    "network request failed",
    "failed to fetch",
    "fetch failed",
    "load failed",
    "connection refused",
    "econnreset",
    "econnrefused",
    "etimedout",
    "socket closed",
    "socket hang up",
    "stream ended unexpectedly",
    "readable stream error",
];

/// True if the failure says the server is rate limiting us.
///
/// Matches `rate limit`, `too many requests` or `429` anywhere in the
/// message, case-insensitively.
///
/// # Examples
///
/// ```
/// use callvault_streaming::is_rate_limit_error;
///
/// assert!(is_rate_limit_error("Too Many Requests"));
/// assert!(is_rate_limit_error("HTTP 429"));
/// assert!(!is_rate_limit_error(None::<&str>));
/// ```
pub fn is_rate_limit_error<'a>(error: impl Into<ErrorSubject<'a>>) -> bool {
    let subject = error.into();
    subject
        .message()
        .is_some_and(|message| contains_any(message, RATE_LIMIT_PATTERNS))
}

/// True if the failure is a transient network or stream interruption.
///
/// An error named exactly `AbortError` always qualifies; otherwise the
/// message is matched case-insensitively against known connection, socket
/// and stream failure phrases.
///
/// # Examples
///
/// ```
/// use callvault_streaming::is_streaming_interruption_error;
///
/// assert!(is_streaming_interruption_error("read ECONNRESET"));
/// assert!(is_streaming_interruption_error("TypeError: Failed to fetch"));
/// assert!(!is_streaming_interruption_error("rate limit exceeded"));
/// ```
pub fn is_streaming_interruption_error<'a>(error: impl Into<ErrorSubject<'a>>) -> bool {
    let subject = error.into();
    if subject.name() == Some("AbortError") {
        return true;
    }
    subject
        .message()
        .is_some_and(|message| contains_any(message, INTERRUPTION_PATTERNS))
}

fn contains_any(message: &str, patterns: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    patterns.iter().any(|pattern| lowered.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use callvault_error::{TransportError, TransportErrorKind};

    #[test]
    fn test_rate_limit_is_case_insensitive() {
        for message in [
            "RATE LIMIT exceeded",
            "Rate Limit",
            "too MANY requests",
            "Too Many Requests",
            "status 429",
            "429",
        ] {
            assert!(is_rate_limit_error(message), "{message}");
        }
    }

    #[test]
    fn test_rate_limit_rejects_non_errors() {
        assert!(!is_rate_limit_error(None::<&str>));
        assert!(!is_rate_limit_error(()));
        assert!(!is_rate_limit_error(123_i64));
        assert!(!is_rate_limit_error(429_u16));
        assert!(!is_rate_limit_error("internal server error"));
    }

    #[test]
    fn test_interruption_matches_abort_error_by_name() {
        let err = TransportError::new(TransportErrorKind::Interrupted {
            name: "AbortError".to_string(),
            message: "signal is gone".to_string(),
        });
        assert!(is_streaming_interruption_error(&err));
    }

    #[test]
    fn test_interruption_name_must_match_exactly() {
        let subject = ErrorSubject::Error {
            name: "aborterror".into(),
            message: "nothing to see".into(),
        };
        assert!(!is_streaming_interruption_error(subject));
    }

    #[test]
    fn test_interruption_patterns() {
        for message in [
            "The operation was aborted",
            "Network Error",
            "Network request failed",
            "TypeError: Failed to fetch",
            "fetch failed",
            "Load failed",
            "connection refused",
            "read ECONNRESET",
            "connect ECONNREFUSED 127.0.0.1:443",
            "ETIMEDOUT",
            "socket closed",
            "socket hang up",
            "Stream ended unexpectedly",
            "Readable stream error",
        ] {
            assert!(is_streaming_interruption_error(message), "{message}");
        }
    }

    #[test]
    fn test_classifiers_are_disjoint_for_typical_messages() {
        let rate_limited = "Too many requests, retry after 10 seconds";
        assert!(is_rate_limit_error(rate_limited));
        assert!(!is_streaming_interruption_error(rate_limited));

        let dropped = "socket hang up";
        assert!(is_streaming_interruption_error(dropped));
        assert!(!is_rate_limit_error(dropped));
    }

    #[test]
    fn test_transport_location_does_not_leak_into_message() {
        // Display includes a line number that could contain "429"
        let err = TransportError::new(TransportErrorKind::Request("bad gateway".to_string()));
        assert!(!is_rate_limit_error(&err));
    }
}
