//! Retry execution engine with policy-based configuration
//!
//! Wraps a fallible async operation, classifies each failure through a
//! [`RetryPredicate`], and retries only what the predicate accepts.
//!
//! # Features
//!
//! - Exponential (`base * 2^k`) and fixed-delay strategies, no jitter
//! - Observable attempts via the `RetryObserver` trait
//! - Built-in `TracingObserver` for logging
//! - The last observed failure is always returned unchanged inside `RetryError`
//!
//! # Example
//!
//! ```rust,no_run
//! use pantry_core::retry::{RetryError, RetryExecutorBuilder, TracingObserver};
//! use pantry_core::types::RetryPolicy;
//!
//! async fn example() -> Result<String, RetryError<std::io::Error>> {
//!     RetryExecutorBuilder::new()
//!         .with_policy(RetryPolicy::default())
//!         .with_observer(TracingObserver::new("lookup"))
//!         .build()
//!         .execute(|| async { Ok("success".to_string()) })
//!         .await
//! }
//! ```

mod error;
mod executor;
mod observer;
mod strategies;

pub use error::RetryError;
pub use executor::{RetryExecutor, RetryExecutorBuilder};
#[cfg(test)]
pub use observer::StatsObserver;
pub use observer::{NoOpObserver, RetryObserver, TracingObserver};
pub use strategies::{
    calculate_delay, AlwaysRetry, ClosurePredicate, CodedError, MessagePredicate, RetryPredicate,
};

#[cfg(test)]
mod tests;
