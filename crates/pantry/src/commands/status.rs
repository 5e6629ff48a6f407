//! Status command

use anyhow::Result;
use camino::Utf8Path;
use pantry_core::readiness::{ReadinessOrchestrator, ResourceState};
use pantry_runtime::{DockerRuntime, PgIsReadyProbe};

use crate::cli::StatusArgs;
use crate::output;

pub async fn run(args: StatusArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let project = super::load_project(config_path)?;
    let config = &project.config;

    let runtime = DockerRuntime::new(&config.container, project.dir.clone());
    let probe = PgIsReadyProbe::new(&config.container, &config.database);
    let orchestrator = ReadinessOrchestrator::new(&runtime, &probe, &config.container.name);

    let state = orchestrator.inspect().await?;

    if args.json {
        let status = serde_json::json!({
            "container": orchestrator.resource(),
            "state": state,
            "ready": state == ResourceState::Ready,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    output::header(&format!("Status: {}", orchestrator.resource()));
    output::kv("Runtime", runtime.command());
    output::kv("State", &state.to_string());

    match state {
        ResourceState::Ready => output::success("Database is accepting connections"),
        ResourceState::Running => output::warning("Container is running but not answering yet"),
        ResourceState::StoppedExists | ResourceState::Absent => {
            output::info("Run 'pantry setup' to bring the database up")
        }
    }
    Ok(())
}
