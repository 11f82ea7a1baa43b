//! Integration tests for streaming session state.

use callvault_core::{ChatMessage, ManualClock, Role};
use callvault_error::{TransportError, TransportErrorKind};
use callvault_streaming::{
    ErrorDisposition, SessionEvent, StreamingSession, extract_retry_after_seconds,
    is_rate_limit_error, is_streaming_interruption_error,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const NOW: u64 = 1_700_000_000_000;

fn session() -> (StreamingSession, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(NOW));
    (StreamingSession::with_clock(clock.clone()), clock)
}

fn interrupted(message: &str) -> Arc<TransportError> {
    Arc::new(TransportError::new(TransportErrorKind::Interrupted {
        name: "TypeError".to_string(),
        message: message.to_string(),
    }))
}

#[test]
fn test_clear_cooldown_fires_callback_once() {
    let (mut session, _clock) = session();
    let fired = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&fired);
    session.on_rate_limit_end(move || *counter.lock().unwrap() += 1);

    session.set_rate_limit_cooldown(NOW + 30_000, 30);
    assert!(session.clear_rate_limit_cooldown());
    assert!(!session.clear_rate_limit_cooldown());

    assert_eq!(*fired.lock().unwrap(), 1);
    assert!(!session.is_rate_limited());
    assert_eq!(session.rate_limit_seconds(), 0);
}

#[test]
fn test_clear_without_cooldown_does_not_fire() {
    let (mut session, _clock) = session();
    let fired = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&fired);
    session.on_rate_limit_end(move || *flag.lock().unwrap() = true);

    assert!(!session.clear_rate_limit_cooldown());
    assert!(!*fired.lock().unwrap());
}

#[test]
fn test_rate_limited_follows_cooldown_end() {
    let (mut session, clock) = session();

    session.set_rate_limit_cooldown(NOW + 30_000, 30);
    assert!(session.is_rate_limited());

    session.set_rate_limit_cooldown(NOW - 1_000, 30);
    assert!(!session.is_rate_limited());

    session.set_rate_limit_cooldown(NOW + 1_000, 1);
    clock.advance(1_000);
    assert!(!session.is_rate_limited());
}

#[test]
fn test_reset_clears_every_reconnection_field() {
    let (mut session, _clock) = session();
    session.set_reconnecting(true);
    session.begin_reconnect_attempt();
    session.begin_reconnect_attempt();
    session.set_last_user_message("Hello");
    session.set_incomplete_message_ids(HashSet::from(["a1".to_string(), "a2".to_string()]));
    session.mark_handled(&interrupted("network error"));

    session.reset_reconnection_state();

    assert_eq!(session.reconnect_attempts(), 0);
    assert_eq!(session.reconnect_attempt_display(), 0);
    assert!(!session.is_reconnecting());
    assert_eq!(session.last_user_message(), None);
    assert!(session.incomplete_message_ids().is_empty());
    assert!(session.handled_error().is_none());
}

#[test]
fn test_set_incomplete_ids_replaces_set() {
    let (mut session, _clock) = session();
    session.set_incomplete_message_ids(HashSet::from(["a1".to_string()]));
    session.set_incomplete_message_ids(HashSet::from(["a2".to_string()]));

    assert!(!session.is_incomplete("a1"));
    assert!(session.is_incomplete("a2"));
}

#[test]
fn test_rate_limit_scenario_starts_cooldown() {
    let (mut session, _clock) = session();
    session.set_last_user_message("Hello");
    let error = Arc::new(TransportError::new(TransportErrorKind::Request(
        "Too many requests, retry after 10 seconds".to_string(),
    )));

    assert!(is_rate_limit_error(&*error));
    assert_eq!(extract_retry_after_seconds(&*error), 10);

    let disposition = session.handle_error(&error, &[]);

    assert_eq!(disposition, ErrorDisposition::Cooldown { seconds: 10 });
    assert!(session.is_rate_limited());
    assert_eq!(session.rate_limit_seconds(), 10);
    assert_eq!(session.rate_limit_cooldown_end(), Some(NOW + 10_000));
    assert_eq!(session.last_user_message(), None);
}

#[test]
fn test_same_error_is_handled_once() {
    let (mut session, _clock) = session();
    let error = Arc::new(TransportError::new(TransportErrorKind::RateLimited {
        status: 429,
        message: "rate limit exceeded".to_string(),
    }));

    assert_eq!(
        session.handle_error(&error, &[]),
        ErrorDisposition::Cooldown { seconds: 30 }
    );
    assert_eq!(
        session.handle_error(&error, &[]),
        ErrorDisposition::AlreadyHandled
    );
}

#[test]
fn test_interruption_scenario_counts_and_caps_attempts() {
    let (mut session, _clock) = session();
    session.set_last_user_message("Hello");
    let messages = vec![
        ChatMessage::new("u1", Role::User, "Hello"),
        ChatMessage::new("a1", Role::Assistant, "Your last call"),
    ];

    let mut attempts = Vec::new();
    for _ in 0..4 {
        let error = interrupted("ECONNRESET");
        assert!(is_streaming_interruption_error(&*error));
        assert_eq!(
            session.handle_error(&error, &messages),
            ErrorDisposition::Reconnect
        );
        session.set_reconnecting(true);
        attempts.push(session.begin_reconnect_attempt());
    }

    assert_eq!(attempts, vec![Some(1), Some(2), Some(3), None]);
    assert_eq!(session.reconnect_attempts(), 3);
    assert!(session.is_incomplete("a1"));
}

#[test]
fn test_observers_see_state_changes() {
    let (mut session, clock) = session();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    session.set_rate_limit_cooldown(NOW + 2_000, 2);
    clock.advance(2_000);
    session.tick();
    session.set_reconnecting(true);
    session.set_reconnecting(true);
    session.begin_reconnect_attempt();
    session.mark_incomplete("a1");
    session.reset_reconnection_state();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            SessionEvent::RateLimitStarted {
                end_ms: NOW + 2_000,
                seconds: 2
            },
            SessionEvent::RateLimitEnded,
            SessionEvent::ReconnectStarted,
            SessionEvent::ReconnectAttempt { attempt: 1 },
            SessionEvent::IncompleteMessagesChanged { count: 1 },
            SessionEvent::ReconnectionReset,
        ]
    );
}
