//! Retry delay strategies and predicates
//!
//! This module computes the delay before each retry and provides a trait for
//! deciding whether an error should be retried at all.

use crate::types::{RetryPolicy, RetryStrategy};
use std::error::Error;
use std::time::Duration;

/// Calculate the delay before the next retry attempt
///
/// # Arguments
///
/// * `policy` - The retry policy containing strategy and timing parameters
/// * `attempt` - The attempt that just failed (1-indexed)
///
/// Exponential backoff yields `base * 2^(attempt - 1)`; delays are
/// deterministic and saturate instead of overflowing.
///
/// # Example
///
/// ```rust
/// use pantry_core::retry::calculate_delay;
/// use pantry_core::types::{RetryPolicy, RetryStrategy};
///
/// let policy = RetryPolicy {
///     max_attempts: 3,
///     strategy: RetryStrategy::ExponentialBackoff,
///     base_delay_ms: 1000,
/// };
///
/// assert_eq!(calculate_delay(&policy, 1).as_millis(), 1000);
/// assert_eq!(calculate_delay(&policy, 2).as_millis(), 2000);
/// ```
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    // Attempt is 1-indexed, but we want 0-indexed for calculations
    let attempt_index = attempt.saturating_sub(1);

    let delay_ms = match policy.strategy {
        RetryStrategy::FixedDelay => policy.base_delay_ms,
        RetryStrategy::ExponentialBackoff => policy
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt_index)),
    };

    Duration::from_millis(delay_ms)
}

/// A predicate that determines whether an error should be retried
///
/// Returning `false` classifies the error as fatal: the executor stops on
/// the first occurrence and hands the error back unchanged.
///
/// # Example
///
/// ```rust
/// use pantry_core::retry::RetryPredicate;
/// use std::io::{Error, ErrorKind};
///
/// struct IoRetryPredicate;
///
/// impl RetryPredicate<Error> for IoRetryPredicate {
///     fn should_retry(&self, error: &Error) -> bool {
///         matches!(error.kind(), ErrorKind::TimedOut | ErrorKind::ConnectionRefused)
///     }
/// }
/// ```
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// Determine whether the given error should be retried
    fn should_retry(&self, error: &E) -> bool;
}

/// A predicate that always returns true (all errors are retryable)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// A predicate that uses a closure to determine retryability
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    /// Create a new closure-based predicate
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

/// A trait for errors that may carry a structured error code
///
/// Failures reach the retry layer from different sources: some carry an
/// engine code, others only a message. Predicates inspect both.
pub trait CodedError: std::fmt::Display {
    /// Get the structured error code if available
    fn error_code(&self) -> Option<&str>;
}

/// A predicate that retries only on specific error messages
#[derive(Debug, Clone)]
pub struct MessagePredicate {
    /// Lowercased patterns that indicate retryable errors
    retryable_patterns: Vec<String>,
}

impl MessagePredicate {
    /// Create a new message predicate with the given patterns
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            retryable_patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether the message contains any retryable pattern (case-insensitive)
    pub fn matches(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.retryable_patterns
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
    }
}

impl<E: Error> RetryPredicate<E> for MessagePredicate {
    fn should_retry(&self, error: &E) -> bool {
        self.matches(&error.to_string())
    }
}
