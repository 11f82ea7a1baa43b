//! Integration tests for the shared throttler, driven by a paused Tokio clock.

use callvault_core::{Clock, ThrottleConfig, TokioClock};
use callvault_error::ThrottleErrorKind;
use callvault_rate_limit::{Scope, SharedThrottle};
use std::sync::Arc;
use std::time::Duration;

fn throttle(config: ThrottleConfig) -> (SharedThrottle, Arc<TokioClock>) {
    let clock = Arc::new(TokioClock::starting_at(1_000_000));
    (SharedThrottle::with_clock(config, clock.clone()), clock)
}

#[tokio::test(start_paused = true)]
async fn test_n_plus_one_waits_for_remaining_window() {
    let (throttle, clock) = throttle(ThrottleConfig::new(10, 500, 0));
    let start = clock.now_ms();

    for _ in 0..10 {
        throttle.throttle("fetch").await;
    }
    assert_eq!(clock.now_ms(), start);

    tokio::time::sleep(Duration::from_millis(120)).await;
    throttle.throttle("fetch").await;

    // 500ms window, 120ms already elapsed
    assert!(clock.now_ms() - start >= 500);
    assert_eq!(throttle.window("fetch").await.unwrap().count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_jittered_wait_stays_within_bound() {
    let (throttle, clock) = throttle(ThrottleConfig::new(1, 1_000, 200));
    let start = clock.now_ms();

    throttle.throttle("jitter").await;
    throttle.throttle("jitter").await;

    let waited = clock.now_ms() - start;
    assert!(waited >= 1_000, "waited {waited}ms");
    assert!(waited < 1_200, "waited {waited}ms");
}

#[tokio::test(start_paused = true)]
async fn test_count_resets_after_window_expires() {
    let (throttle, _clock) = throttle(ThrottleConfig::new(5, 100, 0));

    for _ in 0..5 {
        throttle.throttle("reset").await;
    }
    assert_eq!(throttle.window("reset").await.unwrap().count, 5);

    tokio::time::sleep(Duration::from_millis(150)).await;
    throttle.throttle("reset").await;

    assert_eq!(throttle.window("reset").await.unwrap().count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_idle_scope_behaves_as_fresh_window() {
    let (throttle, clock) = throttle(ThrottleConfig::new(3, 1_000, 0));

    for _ in 0..3 {
        throttle.throttle("user:idle").await;
    }
    tokio::time::sleep(Duration::from_millis(2_001)).await;

    let before = clock.now_ms();
    for _ in 0..3 {
        throttle.throttle("user:idle").await;
    }
    assert_eq!(clock.now_ms(), before, "fresh window should not block");
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_stale_sweeps_idle_scopes() {
    let (throttle, _clock) = throttle(ThrottleConfig::new(3, 1_000, 0));

    throttle.throttle("user:a").await;
    throttle.throttle("user:b").await;
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    throttle.throttle("user:c").await;
    assert_eq!(throttle.scope_count().await, 3);

    assert_eq!(throttle.cleanup_stale().await, 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(throttle.cleanup_stale().await, 2);
    assert_eq!(throttle.scope_count().await, 1);
    assert!(throttle.window("user:c").await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_keeps_scope_with_longer_window() {
    let (throttle, clock) = throttle(ThrottleConfig::new(10, 1_000, 0));
    let start = clock.now_ms();

    throttle.throttle_with("long", 2, 60_000).await;
    throttle.throttle_with("long", 2, 60_000).await;
    tokio::time::sleep(Duration::from_millis(2_500)).await;

    // Idle for more than two default windows but still inside its own.
    assert_eq!(throttle.cleanup_stale().await, 0);
    assert_eq!(throttle.window("long").await.unwrap().window_ms, 60_000);

    throttle.throttle_with("long", 2, 60_000).await;
    assert!(clock.now_ms() - start >= 60_000);
    assert_eq!(throttle.window("long").await.unwrap().count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_global_and_user_scopes_are_independent() {
    let (throttle, clock) = throttle(ThrottleConfig::new(50, 1_000, 0));
    let start = clock.now_ms();

    for _ in 0..10 {
        throttle
            .throttle_scopes(&[Scope::global(), Scope::user("user-123")])
            .await;
    }
    for _ in 0..10 {
        throttle
            .throttle_scopes(&[Scope::global(), Scope::user("user-456")])
            .await;
    }

    assert_eq!(clock.now_ms(), start);
    assert_eq!(throttle.window("global").await.unwrap().count, 20);
    assert_eq!(throttle.window("user:user-123").await.unwrap().count, 10);
    assert_eq!(throttle.window("user:user-456").await.unwrap().count, 10);
}

#[tokio::test(start_paused = true)]
async fn test_saturated_global_scope_blocks_every_user() {
    let (throttle, clock) = throttle(ThrottleConfig::new(2, 1_000, 0));
    let start = clock.now_ms();

    throttle
        .throttle_scopes(&[Scope::global(), Scope::user("a")])
        .await;
    throttle
        .throttle_scopes(&[Scope::global(), Scope::user("b")])
        .await;
    throttle
        .throttle_scopes(&[Scope::global(), Scope::user("c")])
        .await;

    assert!(clock.now_ms() - start >= 1_000);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_waiters_are_all_admitted() {
    let (throttle, clock) = throttle(ThrottleConfig::new(3, 1_000, 50));
    let start = clock.now_ms();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let throttle = throttle.clone();
            let clock = clock.clone();
            tokio::spawn(async move {
                throttle.throttle("shared").await;
                clock.now_ms() - start
            })
        })
        .collect();

    let mut admitted_at: Vec<u64> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();
    admitted_at.sort_unstable();

    assert_eq!(admitted_at.len(), 8);
    assert!(admitted_at[..3].iter().all(|&t| t == 0));
    assert!(admitted_at[3..].iter().all(|&t| t >= 1_000));
    assert!(admitted_at[6..].iter().all(|&t| t >= 2_000));
}

#[tokio::test(start_paused = true)]
async fn test_throttle_within_respects_wait_budget() {
    let (throttle, _clock) = throttle(ThrottleConfig::new(1, 10_000, 0).with_max_wait_ms(500));

    throttle.throttle_within("budget").await.unwrap();
    let err = throttle.throttle_within("budget").await.unwrap_err();

    assert_eq!(
        err.kind(),
        &ThrottleErrorKind::WaitExceeded {
            scope: "budget".to_string(),
            max_wait_ms: 500,
        }
    );
    assert_eq!(throttle.window("budget").await.unwrap().count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_throttle_within_without_budget_waits() {
    let (throttle, clock) = throttle(ThrottleConfig::new(1, 300, 0));
    let start = clock.now_ms();

    throttle.throttle_within("unbounded").await.unwrap();
    throttle.throttle_within("unbounded").await.unwrap();

    assert!(clock.now_ms() - start >= 300);
}
