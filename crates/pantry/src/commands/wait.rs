//! Wait command

use anyhow::{bail, Result};
use camino::Utf8Path;
use pantry_core::readiness::{ReadinessOrchestrator, ResourceState};
use pantry_core::types::PollBudget;
use pantry_runtime::{DockerRuntime, PgIsReadyProbe};

use crate::cli::WaitArgs;
use crate::output::{self, DotProgress};

/// Apply command-line overrides on top of the configured budget
fn budget_from(args: &WaitArgs, configured: PollBudget) -> pantry_core::Result<PollBudget> {
    let budget = PollBudget {
        max_attempts: args.max_attempts.unwrap_or(configured.max_attempts),
        interval_ms: args.interval_ms.unwrap_or(configured.interval_ms),
    };
    budget.validate()?;
    Ok(budget)
}

/// Polling only makes sense once the container is up
fn require_started(resource: &str, state: ResourceState) -> Result<()> {
    match state {
        ResourceState::Running | ResourceState::Ready => Ok(()),
        ResourceState::Absent | ResourceState::StoppedExists => bail!(
            "Container '{}' is {}; run 'pantry setup' to bring it up",
            resource,
            state
        ),
    }
}

pub async fn run(args: WaitArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let project = super::load_project(config_path)?;
    let config = &project.config;
    let budget = budget_from(&args, config.readiness)?;

    let runtime = DockerRuntime::new(&config.container, project.dir.clone());
    let probe = PgIsReadyProbe::new(&config.container, &config.database);
    let orchestrator = ReadinessOrchestrator::new(&runtime, &probe, &config.container.name)
        .with_budget(budget)
        .with_observer(DotProgress);

    let state = orchestrator.discover().await?;
    require_started(orchestrator.resource(), state)?;

    output::info(&format!(
        "Waiting for {} (up to {} probes, {} ms apart)",
        orchestrator.resource(),
        budget.max_attempts,
        budget.interval_ms
    ));
    let probes = orchestrator.poll_liveness().await?;
    output::success(&format!("Database is ready after {} probe(s)", probes));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_configured_budget() {
        let args = WaitArgs {
            max_attempts: Some(5),
            interval_ms: None,
        };
        let budget = budget_from(&args, PollBudget::default()).unwrap();
        assert_eq!(budget.max_attempts, 5);
        assert_eq!(budget.interval_ms, 1000);
    }

    #[test]
    fn test_stopped_or_absent_container_is_not_polled() {
        for state in [ResourceState::Absent, ResourceState::StoppedExists] {
            let err = require_started("nutrition-tracker-db", state).unwrap_err();
            assert!(err.to_string().contains("pantry setup"), "{state}: {err}");
        }
        assert!(require_started("nutrition-tracker-db", ResourceState::Running).is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let args = WaitArgs {
            max_attempts: Some(0),
            interval_ms: Some(10),
        };
        assert!(budget_from(&args, PollBudget::default()).is_err());
    }
}
