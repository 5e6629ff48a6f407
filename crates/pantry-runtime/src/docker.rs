//! Docker-backed container runtime

use async_trait::async_trait;
use camino::Utf8PathBuf;
use pantry_core::process::CommandError;
use pantry_core::readiness::ContainerRuntime;
use pantry_core::types::{ComposeDialect, ContainerConfig};
use tracing::info;

use crate::utils::{lists_name, run_command_async};

/// Container runtime driven through the docker CLI
///
/// Creation goes through compose in the project directory, so the compose
/// file there must declare the database service.
pub struct DockerRuntime {
    /// Runtime executable (`docker`, or a compatible CLI such as `podman`)
    command: String,
    compose_file: Option<Utf8PathBuf>,
    project_dir: Utf8PathBuf,
}

impl DockerRuntime {
    pub fn new(config: &ContainerConfig, project_dir: Utf8PathBuf) -> Self {
        Self {
            command: config.runtime_command.clone(),
            compose_file: config.compose_file.clone(),
            project_dir,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Program and arguments for `compose up -d` in the given dialect
    pub fn compose_up_invocation(&self, dialect: ComposeDialect) -> (String, Vec<String>) {
        let (program, mut args) = dialect.invocation(&self.command);
        if let Some(file) = &self.compose_file {
            args.push("-f".to_string());
            args.push(file.to_string());
        }
        args.push("up".to_string());
        args.push("-d".to_string());
        (program, args)
    }

    async fn list_names(&self, all: bool, name: &str) -> Result<bool, CommandError> {
        let filter = format!("name=^/?{}$", name);
        let mut args = vec!["ps"];
        if all {
            args.push("-a");
        }
        args.extend(["--filter", filter.as_str(), "--format", "{{.Names}}"]);

        let output = run_command_async(&self.command, &args, None).await?;
        Ok(lists_name(&output, name))
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn is_running(&self, name: &str) -> Result<bool, CommandError> {
        self.list_names(false, name).await
    }

    async fn exists(&self, name: &str) -> Result<bool, CommandError> {
        self.list_names(true, name).await
    }

    async fn start(&self, name: &str) -> Result<(), CommandError> {
        info!("Starting container {}...", name);
        run_command_async(&self.command, &["start", name], None).await?;
        Ok(())
    }

    async fn create(&self, dialect: ComposeDialect) -> Result<(), CommandError> {
        let (program, args) = self.compose_up_invocation(dialect);
        info!("Creating container with {}", dialect);
        run_command_async(&program, &args, Some(&self.project_dir)).await?;
        Ok(())
    }
}
