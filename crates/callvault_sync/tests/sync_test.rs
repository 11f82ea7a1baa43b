//! Meeting sync tests against a scripted client under paused time.

use async_trait::async_trait;
use callvault_core::{Clock, ThrottleConfig, TokioClock};
use callvault_error::{TransportError, TransportErrorKind};
use callvault_rate_limit::SharedThrottle;
use callvault_sync::{DateRange, MeetingSync, MeetingsClient, PageQuery, RecordingsPage};
use chrono::NaiveDate;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<RecordingsPage, TransportError>>>,
    queries: Mutex<Vec<PageQuery>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<RecordingsPage, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<PageQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MeetingsClient for ScriptedClient {
    async fn list_recordings(&self, query: &PageQuery) -> Result<RecordingsPage, TransportError> {
        self.queries.lock().unwrap().push(query.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(page(&[], None)))
    }
}

fn page(uuids: &[&str], next: Option<&str>) -> RecordingsPage {
    let meetings = uuids
        .iter()
        .map(|uuid| {
            format!(
                r#"{{"uuid":"{uuid}","id":1,"topic":"Call {uuid}","start_time":"2025-03-01T09:00:00Z","duration":30}}"#
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    let next = next.map(|token| format!(r#","next_page_token":"{token}""#)).unwrap_or_default();
    serde_json::from_str(&format!(r#"{{"meetings":[{meetings}]{next}}}"#)).unwrap()
}

fn too_many() -> Result<RecordingsPage, TransportError> {
    Err(TransportError::new(TransportErrorKind::RateLimited {
        status: 429,
        message: "Too many requests".to_string(),
    }))
}

fn range() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
    )
}

fn sync(
    replies: Vec<Result<RecordingsPage, TransportError>>,
    config: ThrottleConfig,
) -> (MeetingSync<ScriptedClient>, Arc<TokioClock>) {
    let clock = Arc::new(TokioClock::starting_at(5_000_000));
    let throttle = SharedThrottle::with_clock(config, clock.clone());
    (MeetingSync::new(ScriptedClient::new(replies), throttle), clock)
}

#[tokio::test(start_paused = true)]
async fn test_follows_page_cursor_and_marks_synced() {
    let (sync, _clock) = sync(
        vec![
            Ok(page(&["a", "b"], Some("p2"))),
            Ok(page(&["c"], Some(""))),
        ],
        ThrottleConfig::new(90, 1_000, 0),
    );
    let synced = HashSet::from(["b".to_string()]);

    let report = sync.sync("user-7", range(), &synced).await.unwrap();

    assert_eq!(report.meetings().len(), 3);
    assert_eq!(*report.synced(), 1);
    assert_eq!(report.unsynced(), 2);
    assert_eq!(*report.pages(), 2);

    let queries = sync.client().queries();
    assert_eq!(queries[0].next_page_token, None);
    assert_eq!(queries[1].next_page_token.as_deref(), Some("p2"));
}

#[tokio::test(start_paused = true)]
async fn test_each_page_passes_global_and_user_scopes() {
    let (sync, _clock) = sync(
        vec![Ok(page(&["a"], Some("p2"))), Ok(page(&["b"], None))],
        ThrottleConfig::new(90, 1_000, 0),
    );

    sync.fetch_all("user-7", range()).await.unwrap();

    let throttle = sync.throttle();
    assert_eq!(throttle.window("global").await.unwrap().count, 2);
    assert_eq!(throttle.window("user:user-7").await.unwrap().count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_429_backs_off_exponentially() {
    let (sync, clock) = sync(
        vec![too_many(), too_many(), Ok(page(&["a"], None))],
        ThrottleConfig::new(90, 1_000, 0),
    );
    let start = clock.now_ms();

    let page = sync.fetch_page("user-7", &PageQuery::first(range())).await.unwrap();

    assert_eq!(page.meetings.len(), 1);
    // 1000ms then 2000ms
    assert_eq!(clock.now_ms() - start, 3_000);
    assert_eq!(sync.client().queries().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_429_gives_up_after_retry_limit() {
    let (sync, _clock) = sync(
        vec![too_many(), too_many(), too_many(), too_many(), too_many()],
        ThrottleConfig::new(90, 1_000, 0),
    );

    let err = sync
        .fetch_page("user-7", &PageQuery::first(range()))
        .await
        .unwrap_err();

    assert!(err.is_too_many_requests());
    assert_eq!(sync.client().queries().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_client_error_is_not_retried() {
    let (sync, _clock) = sync(
        vec![Err(TransportError::new(TransportErrorKind::Status {
            status: 401,
            message: "invalid access token".to_string(),
        }))],
        ThrottleConfig::new(90, 1_000, 0),
    );

    let err = sync
        .fetch_page("user-7", &PageQuery::first(range()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(sync.client().queries().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_local_throttle_spaces_out_pages() {
    let replies = (0..3)
        .map(|i| Ok(page(&["x"], (i < 2).then_some("more"))))
        .collect();
    let (sync, clock) = sync(replies, ThrottleConfig::new(2, 1_000, 0));
    let start = clock.now_ms();

    let (recordings, pages) = sync.fetch_all("user-7", range()).await.unwrap();

    assert_eq!(recordings.len(), 3);
    assert_eq!(pages, 3);
    assert!(clock.now_ms() - start >= 1_000);
}
