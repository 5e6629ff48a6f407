//! Process-wide database pool handle
//!
//! The pool is created lazily on first use, shared by every caller in the
//! process, and closed at most once no matter how many shutdown signals
//! arrive.

use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tokio::sync::OnceCell;

use super::classify::DbError;
use crate::error::{Error, Result};
use crate::types::DatabaseConfig;

/// A connection pool that can be shut down
#[async_trait]
pub trait ManagedPool: Send + Sync + 'static {
    /// Close all connections
    async fn close(&self);
}

#[async_trait]
impl ManagedPool for PgPool {
    async fn close(&self) {
        sqlx::Pool::close(self).await;
    }
}

/// Lazily-initialised shared pool with an idempotent close
///
/// Intended to live in a `static`:
///
/// ```rust
/// use pantry_core::db::SharedPool;
/// use sqlx::PgPool;
///
/// static POOL: SharedPool<PgPool> = SharedPool::new();
/// ```
pub struct SharedPool<P> {
    cell: OnceCell<P>,
    closed: AtomicBool,
}

impl<P> Default for SharedPool<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> SharedPool<P> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
            closed: AtomicBool::new(false),
        }
    }

    /// The pool, if it has been created
    pub fn get(&self) -> Option<&P> {
        self.cell.get()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl<P: ManagedPool> SharedPool<P> {
    /// Return the pool, creating it with `init` on first use
    ///
    /// Concurrent first callers run `init` once. A failed `init` leaves the
    /// handle empty so a later call can try again. After `close` every call
    /// fails.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> std::result::Result<&P, DbError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<P, DbError>>,
    {
        if self.is_closed() {
            return Err(DbError::new("the pool has been closed"));
        }
        self.cell.get_or_try_init(init).await
    }

    /// Close the pool
    ///
    /// Returns `true` for the call that performed the close and `false` for
    /// every later call. Closing a pool that was never created only marks
    /// the handle closed.
    pub async fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Some(pool) = self.cell.get() {
            tracing::debug!("closing database pool");
            pool.close().await;
        }
        true
    }
}

/// Open a Postgres pool using the configured acquire and statement timeouts
///
/// A `schema` query parameter, as written for the schema tool, becomes the
/// session `search_path`.
pub async fn connect_pg_pool(
    url: &str,
    config: &DatabaseConfig,
) -> std::result::Result<PgPool, DbError> {
    let (url, schema) = split_schema_param(url);
    let mut options = PgConnectOptions::from_str(&url).map_err(DbError::from)?;
    if config.statement_timeout_ms > 0 {
        let timeout = config.statement_timeout_ms.to_string();
        options = options.options([("statement_timeout", timeout.as_str())]);
    }
    if let Some(schema) = schema {
        options = options.options([("search_path", schema.as_str())]);
    }

    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await
        .map_err(DbError::from)
}

/// Remove the `schema` query parameter, which the Postgres driver does not
/// understand, and return its value
fn split_schema_param(url: &str) -> (String, Option<String>) {
    let Some((base, query)) = url.split_once('?') else {
        return (url.to_string(), None);
    };

    let mut schema = None;
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| match pair.split_once('=') {
            Some(("schema", value)) => {
                if !value.is_empty() {
                    schema = Some(value.to_string());
                }
                false
            }
            _ => !pair.is_empty(),
        })
        .collect();

    if kept.is_empty() {
        (base.to_string(), schema)
    } else {
        (format!("{}?{}", base, kept.join("&")), schema)
    }
}

/// Round-trip a trivial query
pub async fn ping(pool: &PgPool) -> std::result::Result<(), DbError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(DbError::from)
}

/// Read `DATABASE_URL` from the environment
///
/// The hint on failure depends on `PANTRY_ENV`: local runs (unset or
/// `development`) are pointed at `pantry setup`, every other environment is
/// told to set the variable.
pub fn resolve_database_url() -> Result<String> {
    resolve_database_url_with(|key| std::env::var(key).ok())
}

pub(crate) fn resolve_database_url_with<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
        Some(url) => Ok(url),
        None => {
            let local = lookup("PANTRY_ENV").map_or(true, |env| env == "development");
            let hint = if local {
                "Run `pantry setup` to create a .env file with a local connection string."
            } else {
                "Set it in your deployment environment."
            };
            Err(Error::DatabaseUrlMissing {
                hint: hint.to_string(),
            })
        }
    }
}
