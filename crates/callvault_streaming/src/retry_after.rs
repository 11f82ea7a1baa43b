//! Retry hint extraction from rate-limit messages.

use crate::ErrorSubject;
use callvault_core::limits::{DEFAULT_RETRY_AFTER_SECS, MAX_RETRY_AFTER_SECS};
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn patterns() -> &'static [Regex] {
    PATTERNS.get_or_init(|| {
        [
            // "retry after 30 seconds", "retry-after: 30", "Retry-After 30"
            r"(?i)retry[- ]?after[:\s]+(\d+)",
            // "wait 30s", "wait 30 s"
            r"(?i)wait\s+(\d+)\s*s",
            // "30 seconds"
            r"(?i)(\d+)\s*seconds?",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("Valid retry-after regex"))
        .collect()
    })
}

/// Seconds to wait before retrying, parsed from a rate-limit error.
///
/// Tries, in order, `retry after N`, `retry-after: N`, `wait Ns` and a bare
/// `N seconds`. A parsed value outside `1..=300` is ignored and the next
/// pattern is tried; with nothing usable the answer is 30. Never fails.
///
/// # Examples
///
/// ```
/// use callvault_streaming::extract_retry_after_seconds;
///
/// assert_eq!(extract_retry_after_seconds("retry after 45 seconds"), 45);
/// assert_eq!(extract_retry_after_seconds("retry-after: 120"), 120);
/// assert_eq!(extract_retry_after_seconds("wait 15s"), 15);
/// assert_eq!(extract_retry_after_seconds("retry after 600 seconds"), 30);
/// assert_eq!(extract_retry_after_seconds("no info"), 30);
/// ```
pub fn extract_retry_after_seconds<'a>(error: impl Into<ErrorSubject<'a>>) -> u64 {
    extract_retry_after_seconds_within(error, DEFAULT_RETRY_AFTER_SECS, MAX_RETRY_AFTER_SECS)
}

/// [`extract_retry_after_seconds`] with an explicit default and cap.
pub fn extract_retry_after_seconds_within<'a>(
    error: impl Into<ErrorSubject<'a>>,
    default_secs: u64,
    max_secs: u64,
) -> u64 {
    let subject = error.into();
    let Some(message) = subject.message() else {
        return default_secs;
    };

    for pattern in patterns() {
        let Some(seconds) = pattern
            .captures(message)
            .and_then(|captures| captures.get(1))
            .and_then(|digits| digits.as_str().parse::<u64>().ok())
        else {
            continue;
        };

        if (1..=max_secs).contains(&seconds) {
            trace!(seconds, pattern = pattern.as_str(), "Parsed retry hint");
            return seconds;
        }
        trace!(seconds, max_secs, "Ignoring out-of-range retry hint");
    }

    default_secs
}
