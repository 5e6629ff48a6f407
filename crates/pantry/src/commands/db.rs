//! Database commands

use anyhow::{anyhow, Context, Result};
use camino::Utf8Path;
use pantry_core::db::{
    connect_pg_pool, ping as ping_pool, resolve_database_url, retry_transient, SharedPool,
};
use sqlx::PgPool;

use crate::output;

/// The process-wide pool
static POOL: SharedPool<PgPool> = SharedPool::new();

pub async fn ping(config_path: Option<&Utf8Path>) -> Result<()> {
    let project = super::load_project(config_path)?;
    let config = &project.config;

    let env_path = project.dir.join(&config.env_file.path);
    match dotenvy::from_path(&env_path) {
        Ok(()) => tracing::debug!(path = %env_path, "loaded env file"),
        Err(e) if e.not_found() => tracing::debug!(path = %env_path, "no env file"),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", env_path)),
    }
    let url = resolve_database_url()?;

    let spinner = output::spinner("Pinging database...");
    let work = retry_transient(&config.retry, "db ping", || {
        let url = url.as_str();
        let database = &config.database;
        async move {
            let pool = POOL
                .get_or_init(|| connect_pg_pool(url, database))
                .await?;
            ping_pool(pool).await
        }
    });

    let outcome = tokio::select! {
        result = work => result.map_err(anyhow::Error::from),
        signal = shutdown_signal() => Err(anyhow!("Interrupted by {}", signal)),
    };
    spinner.finish_and_clear();

    // Every exit path closes the pool exactly once
    if POOL.close().await {
        tracing::debug!("database pool closed");
    }

    outcome.context("Database ping failed")?;
    output::success("Database answered SELECT 1");
    Ok(())
}

/// Resolve when the process is asked to stop
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::warn!(error = %e, "could not listen for Ctrl-C");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not listen for SIGTERM");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    }
}
