//! End-to-end local environment bring-up
//!
//! Steps, in order: tooling check, container readiness, env file, schema
//! sync, client generation. The first failing step aborts the flow.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use pantry_core::readiness::{
    ContainerRuntime, LivenessProbe, ReadinessOrchestrator, ReadinessReport,
};
use pantry_core::retry::{NoOpObserver, RetryObserver};
use pantry_core::RuntimeConfig;
use tracing::info;

use crate::env_file::{ensure_env_file, EnvFileOutcome};
use crate::prerequisites::{PrerequisiteStatus, ToolingCheck};
use crate::schema::{generate_client, sync_schema, SchemaOutcome, SchemaTool};

/// A step of the setup flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Tooling,
    Container,
    EnvFile,
    Schema,
    GenerateClient,
}

impl std::fmt::Display for SetupStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SetupStep::Tooling => "Checking tooling",
            SetupStep::Container => "Bringing up database container",
            SetupStep::EnvFile => "Checking env file",
            SetupStep::Schema => "Setting up database schema",
            SetupStep::GenerateClient => "Generating client",
        };
        write!(f, "{}", label)
    }
}

/// Receives step boundaries as the flow runs
pub trait SetupReporter: Send + Sync {
    fn step_started(&self, step: SetupStep);
    fn step_finished(&self, step: SetupStep, detail: &str);
}

/// Reporter that ignores every event
pub struct SilentReporter;

impl SetupReporter for SilentReporter {
    fn step_started(&self, _step: SetupStep) {}
    fn step_finished(&self, _step: SetupStep, _detail: &str) {}
}

/// What a successful setup did
#[derive(Debug)]
pub struct SetupReport {
    pub tooling: PrerequisiteStatus,
    pub readiness: ReadinessReport,
    pub env_file: EnvFileOutcome,
    /// `None` when schema steps were skipped
    pub schema: Option<SchemaOutcome>,
    pub client_generated: bool,
}

/// The setup flow over its collaborators
pub struct SetupFlow<'a, O = NoOpObserver> {
    config: &'a RuntimeConfig,
    project_dir: Utf8PathBuf,
    tooling: &'a dyn ToolingCheck,
    runtime: &'a dyn ContainerRuntime,
    probe: &'a dyn LivenessProbe,
    schema: &'a dyn SchemaTool,
    skip_schema: bool,
    observer: O,
}

impl<'a> SetupFlow<'a, NoOpObserver> {
    pub fn new(
        config: &'a RuntimeConfig,
        project_dir: Utf8PathBuf,
        tooling: &'a dyn ToolingCheck,
        runtime: &'a dyn ContainerRuntime,
        probe: &'a dyn LivenessProbe,
        schema: &'a dyn SchemaTool,
    ) -> Self {
        Self {
            config,
            project_dir,
            tooling,
            runtime,
            probe,
            schema,
            skip_schema: false,
            observer: NoOpObserver,
        }
    }
}

impl<'a, O: RetryObserver> SetupFlow<'a, O> {
    /// Skip schema sync and client generation
    pub fn skip_schema(mut self, skip: bool) -> Self {
        self.skip_schema = skip;
        self
    }

    /// Observe liveness polling
    pub fn with_observer<O2: RetryObserver>(self, observer: O2) -> SetupFlow<'a, O2> {
        SetupFlow {
            config: self.config,
            project_dir: self.project_dir,
            tooling: self.tooling,
            runtime: self.runtime,
            probe: self.probe,
            schema: self.schema,
            skip_schema: self.skip_schema,
            observer,
        }
    }

    pub async fn run(self, reporter: &dyn SetupReporter) -> Result<SetupReport> {
        reporter.step_started(SetupStep::Tooling);
        let tooling = self.tooling.check().await.into_result()?;
        reporter.step_finished(SetupStep::Tooling, "tooling available");

        reporter.step_started(SetupStep::Container);
        let readiness =
            ReadinessOrchestrator::new(self.runtime, self.probe, &self.config.container.name)
                .with_budget(self.config.readiness)
                .with_dialects(self.config.container.compose_dialects.clone())
                .with_observer(&self.observer)
                .ensure_ready()
                .await?;
        reporter.step_finished(SetupStep::Container, "database is ready");

        reporter.step_started(SetupStep::EnvFile);
        let env_file = ensure_env_file(
            &self.project_dir,
            &self.config.env_file,
            &self.config.database,
        )
        .context("Failed to create env file")?;
        let detail = match &env_file {
            EnvFileOutcome::Created(path) => format!("{} created", path),
            EnvFileOutcome::AlreadyPresent(path) => format!("{} already present", path),
        };
        reporter.step_finished(SetupStep::EnvFile, &detail);

        if self.skip_schema {
            info!("Skipping schema steps");
            return Ok(SetupReport {
                tooling,
                readiness,
                env_file,
                schema: None,
                client_generated: false,
            });
        }

        reporter.step_started(SetupStep::Schema);
        let schema = sync_schema(self.schema, &self.config.schema).await?;
        let detail = match schema {
            SchemaOutcome::MigrationsApplied => "migrations applied",
            SchemaOutcome::SchemaPushed => "schema pushed",
            SchemaOutcome::PushedAfterMigrationFailure => "schema pushed after migration failure",
        };
        reporter.step_finished(SetupStep::Schema, detail);

        reporter.step_started(SetupStep::GenerateClient);
        generate_client(self.schema).await?;
        reporter.step_finished(SetupStep::GenerateClient, "client generated");

        Ok(SetupReport {
            tooling,
            readiness,
            env_file,
            schema: Some(schema),
            client_generated: true,
        })
    }
}
