//! Ordered alternatives, first success wins
//!
//! Some operations can be performed through several equivalent strategies,
//! for example the two compose command-line dialects. `first_success` tries
//! each in order and stops at the first one that works.

use std::fmt;
use std::future::Future;

/// Every alternative failed (or none was given)
#[derive(Debug)]
pub struct AlternativesError<E> {
    /// Failures in the order the alternatives were tried
    pub failures: Vec<E>,
}

impl<E: fmt::Display> fmt::Display for AlternativesError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no alternatives to try");
        }
        write!(f, "all {} alternatives failed", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            write!(f, "; [{}] {}", i + 1, failure)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for AlternativesError<E> {}

impl<E> AlternativesError<E> {
    /// The failure from the last alternative tried
    pub fn last(&self) -> Option<&E> {
        self.failures.last()
    }
}

/// Try each alternative in order and return the first success
///
/// Alternatives after the first success are never invoked.
pub async fn first_success<S, F, Fut, T, E>(
    alternatives: &[S],
    mut op: F,
) -> Result<T, AlternativesError<E>>
where
    F: FnMut(&S) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut failures = Vec::with_capacity(alternatives.len());

    for (index, alternative) in alternatives.iter().enumerate() {
        match op(alternative).await {
            Ok(value) => {
                if index > 0 {
                    tracing::debug!(alternative = index + 1, "succeeded with fallback alternative");
                }
                return Ok(value);
            }
            Err(err) => {
                tracing::debug!(alternative = index + 1, error = %err, "alternative failed");
                failures.push(err);
            }
        }
    }

    Err(AlternativesError { failures })
}
