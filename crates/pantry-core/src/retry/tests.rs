//! Integration tests for the retry module
//!
//! These tests run on a paused tokio clock so delay arithmetic can be
//! asserted exactly without slowing the suite down.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::retry::error::RetryError;
use crate::retry::executor::RetryExecutorBuilder;
use crate::retry::observer::StatsObserver;
use crate::retry::strategies::ClosurePredicate;
use crate::types::{RetryPolicy, RetryStrategy};

#[derive(Debug, thiserror::Error)]
#[error("attempt {attempt} failed ({kind})")]
struct AttemptFailure {
    attempt: u32,
    kind: &'static str,
}

impl AttemptFailure {
    fn transient(attempt: u32) -> Self {
        Self {
            attempt,
            kind: "transient",
        }
    }

    fn fatal(attempt: u32) -> Self {
        Self {
            attempt,
            kind: "fatal",
        }
    }

    fn is_transient(&self) -> bool {
        self.kind == "transient"
    }
}

fn exponential(max_attempts: u32, base_delay_ms: u64) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        strategy: RetryStrategy::ExponentialBackoff,
        base_delay_ms,
    }
}

fn transient_only() -> ClosurePredicate<fn(&AttemptFailure) -> bool> {
    ClosurePredicate::new(AttemptFailure::is_transient as fn(&AttemptFailure) -> bool)
}

// ============================================================================
// Attempt counting
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_always_transient_makes_exactly_max_attempts() {
    for max_attempts in 1..=5 {
        let calls = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutorBuilder::new()
            .with_policy(exponential(max_attempts, 100))
            .with_predicate(transient_only())
            .build();

        let result: Result<(), RetryError<AttemptFailure>> = executor
            .execute(|| {
                let calls = calls.clone();
                async move {
                    let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(AttemptFailure::transient(attempt))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), max_attempts);
        assert_eq!(calls.load(Ordering::SeqCst), max_attempts);
        // The last observed failure is propagated, not the first
        assert_eq!(err.into_inner().attempt, max_attempts);
    }
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_never_retried() {
    for max_attempts in [1, 3, 10] {
        let calls = Arc::new(AtomicU32::new(0));
        let observer = Arc::new(StatsObserver::new());
        let executor = RetryExecutorBuilder::new()
            .with_policy(exponential(max_attempts, 100))
            .with_predicate(transient_only())
            .with_observer(observer.clone())
            .build();

        let started = Instant::now();
        let result: Result<(), RetryError<AttemptFailure>> = executor
            .execute(|| {
                let calls = calls.clone();
                async move {
                    let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(AttemptFailure::fatal(attempt))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_non_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(observer.non_retryable(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}

#[tokio::test(start_paused = true)]
async fn test_fatal_after_transient_stops_immediately() {
    let calls = Arc::new(AtomicU32::new(0));
    let executor = RetryExecutorBuilder::new()
        .with_policy(exponential(5, 100))
        .with_predicate(transient_only())
        .build();

    let result: Result<(), RetryError<AttemptFailure>> = executor
        .execute(|| {
            let calls = calls.clone();
            async move {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt == 1 {
                    Err(AttemptFailure::transient(attempt))
                } else {
                    Err(AttemptFailure::fatal(attempt))
                }
            }
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_non_retryable());
    assert_eq!(err.attempts(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Delay arithmetic
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_delays_double_from_base() {
    let observer = Arc::new(StatsObserver::new());
    let executor = RetryExecutorBuilder::new()
        .with_policy(exponential(5, 100))
        .with_observer(observer.clone())
        .build();

    let _: Result<(), RetryError<AttemptFailure>> = executor
        .execute(|| async { Err(AttemptFailure::transient(0)) })
        .await;

    assert_eq!(
        observer.delays(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400),
            Duration::from_millis(800),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_total_delay_for_n_retries() {
    let base = 50u64;
    for retries in 1..=6u32 {
        let executor = RetryExecutorBuilder::new()
            .with_policy(exponential(retries + 1, base))
            .build();

        let started = Instant::now();
        let _: Result<(), RetryError<AttemptFailure>> = executor
            .execute(|| async { Err(AttemptFailure::transient(0)) })
            .await;

        // base * (2^n - 1) across n retries
        let expected = base * ((1u64 << retries) - 1);
        assert_eq!(started.elapsed(), Duration::from_millis(expected));
    }
}

#[tokio::test(start_paused = true)]
async fn test_success_after_one_transient_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let observer = Arc::new(StatsObserver::new());
    let executor = RetryExecutorBuilder::new()
        .with_policy(exponential(5, 1000))
        .with_predicate(transient_only())
        .with_observer(observer.clone())
        .build();

    let started = Instant::now();
    let result: Result<&str, RetryError<AttemptFailure>> = executor
        .execute(|| {
            let calls = calls.clone();
            async move {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 2 {
                    Err(AttemptFailure::transient(attempt))
                } else {
                    Ok("recipe saved")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "recipe saved");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(observer.successes(), 1);
    // Only the single backoff before the second attempt
    assert_eq!(started.elapsed(), Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_fixed_strategy_does_not_grow() {
    let observer = Arc::new(StatsObserver::new());
    let executor = RetryExecutorBuilder::new()
        .with_policy(RetryPolicy {
            max_attempts: 4,
            strategy: RetryStrategy::FixedDelay,
            base_delay_ms: 250,
        })
        .with_observer(observer.clone())
        .build();

    let _: Result<(), RetryError<AttemptFailure>> = executor
        .execute(|| async { Err(AttemptFailure::transient(0)) })
        .await;

    assert_eq!(observer.delays(), vec![Duration::from_millis(250); 3]);
}

// ============================================================================
// Independence
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_executions_share_no_state() {
    let executor = RetryExecutorBuilder::new()
        .with_policy(exponential(3, 10))
        .with_predicate(transient_only())
        .build();

    let failing_calls = Arc::new(AtomicU32::new(0));
    let ok_calls = Arc::new(AtomicU32::new(0));

    let failing = executor.execute(|| {
        let calls = failing_calls.clone();
        async move {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err::<(), _>(AttemptFailure::transient(attempt))
        }
    });
    let succeeding = executor.execute(|| {
        let calls = ok_calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AttemptFailure>(7)
        }
    });

    let (failed, succeeded) = tokio::join!(failing, succeeding);

    assert_eq!(failed.unwrap_err().attempts(), 3);
    assert_eq!(succeeded.unwrap(), 7);
    assert_eq!(failing_calls.load(Ordering::SeqCst), 3);
    assert_eq!(ok_calls.load(Ordering::SeqCst), 1);
}
