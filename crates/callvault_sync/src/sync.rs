use crate::{DateRange, MeetingSummary, MeetingsClient, PageQuery, Recording, RecordingsPage};
use callvault_error::{TransportError, TransportErrorKind};
use callvault_rate_limit::{Scope, SharedThrottle};
use derive_getters::Getters;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Retries per page after the provider answers 429.
pub const MAX_PAGE_RETRIES: u32 = 3;

const PAGE_BACKOFF_BASE_MS: u64 = 1_000;

/// Outcome of listing a user's recordings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct SyncReport {
    /// Every recording in the range, newest first as the provider orders them
    meetings: Vec<MeetingSummary>,
    /// How many of `meetings` were imported already
    synced: usize,
    /// Pages fetched
    pages: usize,
}

impl SyncReport {
    /// Recordings not imported yet.
    pub fn unsynced(&self) -> usize {
        self.meetings.len() - self.synced
    }
}

/// Pages through a user's recordings under the shared throttle.
///
/// # Example
///
/// ```no_run
/// use callvault_core::ThrottleConfig;
/// use callvault_rate_limit::SharedThrottle;
/// use callvault_sync::{DateRange, HttpMeetingsClient, MeetingSync};
/// use std::collections::HashSet;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpMeetingsClient::new("https://api.zoom.us/v2", "token");
/// let sync = MeetingSync::new(client, SharedThrottle::new(ThrottleConfig::new(90, 1_000, 100)));
///
/// let report = sync.sync("user-1", DateRange::default_window(), &HashSet::new()).await?;
/// println!("{} new recordings", report.unsynced());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MeetingSync<C> {
    client: C,
    throttle: SharedThrottle,
    max_retries: u32,
}

impl<C: MeetingsClient> MeetingSync<C> {
    /// Sync through `client`, admitting requests via `throttle`.
    pub fn new(client: C, throttle: SharedThrottle) -> Self {
        Self {
            client,
            throttle,
            max_retries: MAX_PAGE_RETRIES,
        }
    }

    /// Override how often a page is retried.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The shared throttle.
    pub fn throttle(&self) -> &SharedThrottle {
        &self.throttle
    }

    /// Fetch one page for `user_id`.
    ///
    /// Each request first passes the `global` and `user:<id>` scopes. A 429
    /// waits `2^retry` seconds and tries again, up to the retry limit.
    /// Network failures and server errors are retried straight away within
    /// the same limit; client errors are returned at once.
    ///
    /// # Errors
    ///
    /// The last transport error once retries run out.
    #[instrument(skip(self, query), fields(token = query.next_page_token.as_deref()))]
    pub async fn fetch_page(
        &self,
        user_id: &str,
        query: &PageQuery,
    ) -> Result<RecordingsPage, TransportError> {
        let scopes = [Scope::global(), Scope::user(user_id)];
        let mut retry = 0;

        loop {
            self.throttle.throttle_scopes(&scopes).await;

            let error = match self.client.list_recordings(query).await {
                Ok(page) => return Ok(page),
                Err(error) => error,
            };

            if retry >= self.max_retries || !is_retryable(&error) {
                return Err(error);
            }

            if error.is_too_many_requests()
                || matches!(error.kind(), TransportErrorKind::RateLimited { .. })
            {
                let wait = Duration::from_millis(PAGE_BACKOFF_BASE_MS << retry.min(16));
                warn!(
                    retry = retry + 1,
                    max = self.max_retries,
                    wait_ms = wait.as_millis() as u64,
                    "Rate limited (429), backing off"
                );
                tokio::time::sleep(wait).await;
            } else {
                warn!(retry = retry + 1, error = %error.message(), "Page request failed, retrying");
            }
            retry += 1;
        }
    }

    /// Fetch every recording in `range`, following the page cursor.
    ///
    /// # Errors
    ///
    /// The first page that fails after retries.
    #[instrument(skip(self))]
    pub async fn fetch_all(
        &self,
        user_id: &str,
        range: DateRange,
    ) -> Result<(Vec<Recording>, usize), TransportError> {
        let mut recordings = Vec::new();
        let mut query = PageQuery::first(range);
        let mut pages = 0;

        loop {
            let page = self.fetch_page(user_id, &query).await?;
            pages += 1;
            recordings.extend(page.meetings.iter().cloned());
            debug!(
                fetched = page.meetings.len(),
                total = recordings.len(),
                "Fetched recordings page"
            );

            match page.next_token() {
                Some(token) => query = query.next(token),
                None => break,
            }
        }

        Ok((recordings, pages))
    }

    /// List recordings in `range` and mark those whose uuid is in `synced_ids`.
    ///
    /// # Errors
    ///
    /// As [`fetch_all`](Self::fetch_all).
    pub async fn sync(
        &self,
        user_id: &str,
        range: DateRange,
        synced_ids: &HashSet<String>,
    ) -> Result<SyncReport, TransportError> {
        let (recordings, pages) = self.fetch_all(user_id, range).await?;

        let meetings: Vec<MeetingSummary> = recordings
            .iter()
            .map(|recording| {
                MeetingSummary::from_recording(recording, synced_ids.contains(&recording.uuid))
            })
            .collect();
        let synced = meetings.iter().filter(|meeting| meeting.synced).count();

        info!(
            total = meetings.len(),
            synced,
            unsynced = meetings.len() - synced,
            "Recordings listed"
        );
        Ok(SyncReport {
            meetings,
            synced,
            pages,
        })
    }
}

fn is_retryable(error: &TransportError) -> bool {
    match error.kind() {
        TransportErrorKind::RateLimited { .. } | TransportErrorKind::Request(_) => true,
        TransportErrorKind::Status { status, .. } => *status == 429 || *status >= 500,
        TransportErrorKind::Interrupted { .. } => true,
    }
}
