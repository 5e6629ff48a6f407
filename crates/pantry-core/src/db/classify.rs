//! Transient-versus-fatal classification of database failures

use std::future::Future;

use thiserror::Error;

use crate::retry::{
    CodedError, MessagePredicate, RetryError, RetryExecutorBuilder, RetryPredicate,
    TracingObserver,
};
use crate::types::RetryPolicy;

/// Engine code: can't reach database server
pub const CODE_SERVER_UNREACHABLE: &str = "P1001";

/// Engine code: timed out fetching a new connection from the pool
pub const CODE_POOL_TIMEOUT: &str = "P2024";

/// Whether a failure may be retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClassification {
    Retryable,
    Fatal,
}

/// A failure reported by the data layer
///
/// Carries the engine code when the layer that produced it had one, and the
/// message in every case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct DbError {
    code: Option<String>,
    message: String,
}

impl DbError {
    /// A failure with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// A failure with an engine code
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl CodedError for DbError {
    fn error_code(&self) -> Option<&str> {
        self.code()
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DbError::with_code(
                CODE_POOL_TIMEOUT,
                "Timed out fetching a new connection from the connection pool",
            ),
            sqlx::Error::Io(e) => DbError::with_code(
                CODE_SERVER_UNREACHABLE,
                format!("Can't reach database server: {}", e),
            ),
            sqlx::Error::PoolClosed => DbError::new("the pool has been closed"),
            sqlx::Error::Database(db_err) => {
                let sqlstate = db_err.code().map(|c| c.into_owned());
                match sqlstate {
                    // connection_exception class and cannot_connect_now (server starting up)
                    Some(state) if state.starts_with("08") || state == "57P03" => {
                        DbError::with_code(
                            CODE_SERVER_UNREACHABLE,
                            format!("Can't reach database server: {}", db_err.message()),
                        )
                    }
                    Some(state) => DbError::with_code(state, db_err.message()),
                    None => DbError::new(db_err.message()),
                }
            }
            other => DbError::new(other.to_string()),
        }
    }
}

/// Classifies connectivity failures as retryable
///
/// A failure is retryable iff its code is one of the known transient engine
/// codes, or its message mentions pool exhaustion, a connection timeout, or
/// an unreachable server. Both paths are checked because failures arrive
/// from different layers with different shapes.
#[derive(Debug, Clone)]
pub struct TransientConnectionPredicate {
    codes: Vec<String>,
    messages: MessagePredicate,
}

impl TransientConnectionPredicate {
    /// Create a predicate from explicit codes and message patterns
    pub fn new(codes: Vec<String>, messages: MessagePredicate) -> Self {
        Self { codes, messages }
    }

    /// Codes and messages emitted by the database layer
    pub fn database_defaults() -> Self {
        Self::new(
            vec![
                CODE_SERVER_UNREACHABLE.to_string(),
                CODE_POOL_TIMEOUT.to_string(),
            ],
            MessagePredicate::new([
                "connection pool",
                "timed out fetching",
                "can't reach database server",
                "server unreachable",
                "connection refused",
                "connection reset",
                CODE_SERVER_UNREACHABLE,
                CODE_POOL_TIMEOUT,
            ]),
        )
    }

    /// Classify a failure
    pub fn classify<E: CodedError + ?Sized>(&self, error: &E) -> FailureClassification {
        let code_matches = error
            .error_code()
            .is_some_and(|code| self.codes.iter().any(|c| c == code));

        if code_matches || self.messages.matches(&error.to_string()) {
            FailureClassification::Retryable
        } else {
            FailureClassification::Fatal
        }
    }
}

impl Default for TransientConnectionPredicate {
    fn default() -> Self {
        Self::database_defaults()
    }
}

impl<E: CodedError> RetryPredicate<E> for TransientConnectionPredicate {
    fn should_retry(&self, error: &E) -> bool {
        self.classify(error) == FailureClassification::Retryable
    }
}

/// Run a data operation, retrying only transient connectivity failures
///
/// Progress is logged through a `TracingObserver` named after `operation`.
pub async fn retry_transient<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation: &str,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: CodedError + std::error::Error + Send + 'static,
{
    RetryExecutorBuilder::new()
        .with_policy(*policy)
        .with_predicate(TransientConnectionPredicate::database_defaults())
        .with_observer(TracingObserver::new(operation))
        .build()
        .execute(op)
        .await
}
