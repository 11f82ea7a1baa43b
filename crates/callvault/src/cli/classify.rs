//! Error classification command.

use callvault::{
    ErrorSubject, extract_retry_after_seconds, is_rate_limit_error,
    is_streaming_interruption_error,
};
use serde::Serialize;
use std::borrow::Cow;

/// How the chat session would treat an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Start a cooldown
    pub rate_limit: bool,
    /// Reconnect and resubmit
    pub interruption: bool,
    /// Cooldown length a rate-limit error would get
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Classify an error by name and message.
pub fn classify(message: &str, name: Option<&str>) -> Classification {
    let subject = || ErrorSubject::Error {
        name: Cow::Borrowed(name.unwrap_or("Error")),
        message: Cow::Borrowed(message),
    };

    let rate_limit = is_rate_limit_error(subject());
    Classification {
        rate_limit,
        interruption: is_streaming_interruption_error(subject()),
        retry_after_secs: rate_limit.then(|| extract_retry_after_seconds(subject())),
    }
}
