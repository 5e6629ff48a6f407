//! Host tooling detection

use async_trait::async_trait;
use pantry_core::alternatives::first_success;
use pantry_core::types::{ContainerConfig, SchemaConfig};
use pantry_core::Error;
use serde::Serialize;

use crate::utils::{command_exists, get_command_version};

/// A tool the bring-up flow depends on
#[derive(Debug, Clone, Serialize)]
pub struct Prerequisite {
    pub name: String,
    pub description: String,
    pub install_hint: Option<String>,
    pub version: Option<String>,
}

/// Result of a tooling check
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrerequisiteStatus {
    pub satisfied: bool,
    pub missing: Vec<Prerequisite>,
    pub available: Vec<Prerequisite>,
}

impl PrerequisiteStatus {
    fn push(&mut self, prerequisite: Prerequisite, found: bool) {
        if found {
            self.available.push(prerequisite);
        } else {
            self.missing.push(prerequisite);
        }
        self.satisfied = self.missing.is_empty();
    }

    /// Fail with `ToolingMissing` for the first missing tool
    pub fn into_result(self) -> pantry_core::Result<Self> {
        match self.missing.first() {
            Some(missing) => Err(Error::tooling_missing(
                &missing.description,
                missing.install_hint.clone().unwrap_or_default(),
            )),
            None => Ok(self),
        }
    }
}

/// Source of a tooling check
#[async_trait]
pub trait ToolingCheck: Send + Sync {
    async fn check(&self) -> PrerequisiteStatus;
}

/// Checks the real host PATH
pub struct HostTooling {
    container: ContainerConfig,
    schema: Option<SchemaConfig>,
}

impl HostTooling {
    pub fn new(container: &ContainerConfig) -> Self {
        Self {
            container: container.clone(),
            schema: None,
        }
    }

    /// Also require the migration tool
    pub fn with_schema_tool(mut self, schema: &SchemaConfig) -> Self {
        self.schema = Some(schema.clone());
        self
    }
}

#[async_trait]
impl ToolingCheck for HostTooling {
    async fn check(&self) -> PrerequisiteStatus {
        let mut status = PrerequisiteStatus {
            satisfied: true,
            ..PrerequisiteStatus::default()
        };
        let runtime = self.container.runtime_command.as_str();

        // Container runtime
        let runtime_found = command_exists(runtime);
        let version = if runtime_found {
            get_command_version(runtime, &["--version"]).await.ok()
        } else {
            None
        };
        status.push(
            Prerequisite {
                name: runtime.to_string(),
                description: "Docker".to_string(),
                install_hint: Some(
                    "Install Docker Desktop: https://docs.docker.com/get-docker/".to_string(),
                ),
                version,
            },
            runtime_found,
        );

        // Compose, in whichever dialect answers first
        let compose = first_success(&self.container.compose_dialects, |dialect| {
            let dialect = *dialect;
            let (program, mut args) = dialect.invocation(runtime);
            args.extend(dialect.version_args().iter().map(|a| a.to_string()));
            async move {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                get_command_version(&program, &args)
                    .await
                    .map(|version| (dialect, version))
            }
        })
        .await;
        let (compose_version, compose_found) = match compose {
            Ok((dialect, version)) => (Some(format!("{} ({})", version, dialect)), true),
            Err(_) => (None, false),
        };
        status.push(
            Prerequisite {
                name: "compose".to_string(),
                description: "Docker Compose".to_string(),
                install_hint: Some(
                    "Install Docker Compose: https://docs.docker.com/compose/install/".to_string(),
                ),
                version: compose_version,
            },
            compose_found,
        );

        // Migration tool
        if let Some(schema) = &self.schema {
            let found = command_exists(&schema.command);
            status.push(
                Prerequisite {
                    name: schema.command.clone(),
                    description: format!("Migration tool ({})", schema.command),
                    install_hint: Some(
                        "Install Node.js (which provides npx): https://nodejs.org/".to_string(),
                    ),
                    version: None,
                },
                found,
            );
        }

        status
    }
}
