//! Liveness probe using the database's own readiness tool

use async_trait::async_trait;
use pantry_core::process::CommandError;
use pantry_core::readiness::LivenessProbe;
use pantry_core::types::{ContainerConfig, DatabaseConfig};

use crate::utils::run_command_async;

/// Runs `pg_isready` inside the container for one user and database
pub struct PgIsReadyProbe {
    runtime_command: String,
    container: String,
    user: String,
    database: String,
}

impl PgIsReadyProbe {
    pub fn new(container: &ContainerConfig, database: &DatabaseConfig) -> Self {
        Self {
            runtime_command: container.runtime_command.clone(),
            container: container.name.clone(),
            user: database.user.clone(),
            database: database.name.clone(),
        }
    }

    pub fn args(&self) -> Vec<&str> {
        vec![
            "exec",
            self.container.as_str(),
            "pg_isready",
            "-U",
            self.user.as_str(),
            "-d",
            self.database.as_str(),
        ]
    }
}

#[async_trait]
impl LivenessProbe for PgIsReadyProbe {
    async fn probe(&self) -> Result<(), CommandError> {
        run_command_async(&self.runtime_command, &self.args(), None).await?;
        Ok(())
    }
}
