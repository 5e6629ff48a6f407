//! Schema synchronization through the migration CLI

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use pantry_core::process::CommandError;
use pantry_core::types::SchemaConfig;
use pantry_core::Error;
use tracing::{info, warn};

use crate::utils::run_command_async;

/// Schema/migration tool operations
#[async_trait]
pub trait SchemaTool: Send + Sync {
    /// Whether any migrations exist to apply
    fn has_migrations(&self) -> bool;

    /// Apply pending migrations
    async fn apply_migrations(&self) -> Result<(), CommandError>;

    /// Push the declared schema straight to the database
    async fn push_schema(&self, accept_data_loss: bool) -> Result<(), CommandError>;

    /// Generate client artifacts from the schema
    async fn generate_client(&self) -> Result<(), CommandError>;
}

/// How the schema was brought in sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    MigrationsApplied,
    /// No migrations exist, schema pushed directly
    SchemaPushed,
    /// Applying migrations failed and the opted-in push fallback succeeded
    PushedAfterMigrationFailure,
}

/// Apply migrations, or push when there are none
///
/// A failed apply is only followed by a push when `allow_push_fallback` is
/// set, since pushing over existing migrations can drop data.
pub async fn sync_schema<S: SchemaTool + ?Sized>(
    tool: &S,
    config: &SchemaConfig,
) -> pantry_core::Result<SchemaOutcome> {
    if !tool.has_migrations() {
        info!("No migrations found, pushing schema directly");
        tool.push_schema(config.accept_data_loss)
            .await
            .map_err(|e| Error::migration("push", e.to_string()))?;
        return Ok(SchemaOutcome::SchemaPushed);
    }

    info!("Found existing migrations, applying them");
    let apply_err = match tool.apply_migrations().await {
        Ok(()) => return Ok(SchemaOutcome::MigrationsApplied),
        Err(e) => e,
    };

    if !config.allow_push_fallback {
        return Err(Error::migration(
            "apply",
            format!(
                "{} (re-run with --allow-push-fallback to push the schema directly)",
                apply_err
            ),
        ));
    }

    warn!(error = %apply_err, "Migration apply failed, pushing schema as fallback");
    tool.push_schema(config.accept_data_loss)
        .await
        .map_err(|e| {
            Error::migration("push", format!("{} (after apply failed: {})", e, apply_err))
        })?;
    Ok(SchemaOutcome::PushedAfterMigrationFailure)
}

/// Generate client artifacts
pub async fn generate_client<S: SchemaTool + ?Sized>(tool: &S) -> pantry_core::Result<()> {
    tool.generate_client()
        .await
        .map_err(|e| Error::migration("generate", e.to_string()))
}

/// Migration tool invoked as a CLI (`npx prisma ...` by default)
pub struct MigrationCli {
    command: String,
    args: Vec<String>,
    migrations_dir: Utf8PathBuf,
    project_dir: Utf8PathBuf,
}

impl MigrationCli {
    pub fn new(config: &SchemaConfig, project_dir: Utf8PathBuf) -> Self {
        let migrations_dir = if config.migrations_dir.is_absolute() {
            config.migrations_dir.clone()
        } else {
            project_dir.join(&config.migrations_dir)
        };
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            migrations_dir,
            project_dir,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Full argument list for a subcommand
    pub fn subcommand_args(&self, subcommand: &[&str]) -> Vec<String> {
        self.args
            .iter()
            .cloned()
            .chain(subcommand.iter().map(|s| s.to_string()))
            .collect()
    }

    async fn run(&self, subcommand: &[&str]) -> Result<(), CommandError> {
        let args = self.subcommand_args(subcommand);
        run_command_async(&self.command, &args, Some(&self.project_dir)).await?;
        Ok(())
    }
}

fn dir_has_entries(dir: &Utf8Path) -> bool {
    dir.read_dir_utf8()
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[async_trait]
impl SchemaTool for MigrationCli {
    fn has_migrations(&self) -> bool {
        dir_has_entries(&self.migrations_dir)
    }

    async fn apply_migrations(&self) -> Result<(), CommandError> {
        self.run(&["migrate", "deploy"]).await
    }

    async fn push_schema(&self, accept_data_loss: bool) -> Result<(), CommandError> {
        if accept_data_loss {
            self.run(&["db", "push", "--accept-data-loss"]).await
        } else {
            self.run(&["db", "push"]).await
        }
    }

    async fn generate_client(&self) -> Result<(), CommandError> {
        self.run(&["generate"]).await
    }
}
