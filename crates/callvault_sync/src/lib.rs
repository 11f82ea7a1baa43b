//! Meeting recording sync for CallVault.
//!
//! Pulls a user's cloud recordings from a meetings provider, one page at a
//! time. Every page request passes the shared throttler on both the
//! `global` scope and the user's own `user:<id>` scope first, so a burst of
//! syncs stays under the provider's published limits. When the provider
//! answers 429 anyway, the page is retried after an exponential wait.
//!
//! The HTTP side sits behind [`MeetingsClient`]; [`HttpMeetingsClient`] is
//! the `reqwest` implementation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod recording;
mod sync;

pub use client::{HttpMeetingsClient, MeetingsClient};
pub use recording::{
    DateRange, MeetingSummary, PageQuery, Recording, RecordingFile, RecordingsPage,
};
pub use sync::{MAX_PAGE_RETRIES, MeetingSync, SyncReport};
