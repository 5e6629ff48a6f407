//! Database failure classification and the shared pool handle
//!
//! Data operations are wrapped individually by the retry engine. Only
//! transient connectivity failures are retried; everything else (constraint
//! violations, malformed input) is returned on first occurrence.

mod classify;
mod pool;

pub use classify::{
    retry_transient, DbError, FailureClassification, TransientConnectionPredicate,
    CODE_POOL_TIMEOUT, CODE_SERVER_UNREACHABLE,
};
pub use pool::{connect_pg_pool, ping, resolve_database_url, ManagedPool, SharedPool};
