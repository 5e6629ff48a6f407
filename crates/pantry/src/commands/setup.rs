//! Setup command

use anyhow::Result;
use camino::Utf8Path;
use pantry_runtime::{
    DockerRuntime, EnvFileOutcome, HostTooling, MigrationCli, PgIsReadyProbe, SchemaOutcome,
    SetupFlow,
};

use crate::cli::SetupArgs;
use crate::output::{self, DotProgress, StepReporter};

pub async fn run(args: SetupArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let mut project = super::load_project(config_path)?;
    if args.allow_push_fallback {
        project.config.schema.allow_push_fallback = true;
    }
    let config = &project.config;

    let mut tooling = HostTooling::new(&config.container);
    if !args.skip_schema {
        tooling = tooling.with_schema_tool(&config.schema);
    }
    let runtime = DockerRuntime::new(&config.container, project.dir.clone());
    let probe = PgIsReadyProbe::new(&config.container, &config.database);
    let schema = MigrationCli::new(&config.schema, project.dir.clone());

    output::header(&format!("Setting up {}", config.container.name));

    let report = SetupFlow::new(
        config,
        project.dir.clone(),
        &tooling,
        &runtime,
        &probe,
        &schema,
    )
    .skip_schema(args.skip_schema)
    .with_observer(DotProgress)
    .run(&StepReporter)
    .await?;

    if report.schema == Some(SchemaOutcome::PushedAfterMigrationFailure) {
        output::warning("Migrations could not be applied; the schema was pushed directly");
    }
    if let EnvFileOutcome::Created(path) = &report.env_file {
        output::info(&format!("Review {} before committing anything", path));
    }

    println!();
    output::success("Local database is ready");
    output::kv("Container", &report.readiness.resource);
    output::kv("Action", &format!("{:?}", report.readiness.action));
    output::kv("Probes", &report.readiness.probe_attempts.to_string());
    output::kv("Connection", &config.database.url());
    Ok(())
}
