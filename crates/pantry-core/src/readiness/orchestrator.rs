//! Idempotent bring-up of a named resource

use std::time::Instant;

use crate::alternatives::first_success;
use crate::error::{Error, Result};
use crate::process::CommandError;
use crate::retry::{ClosurePredicate, NoOpObserver, RetryExecutorBuilder, RetryObserver};
use crate::types::{ComposeDialect, PollBudget};

use super::state::{BringUpPhase, PhaseTrace, ReadinessAction, ReadinessReport, ResourceState};
use super::traits::{ContainerRuntime, LivenessProbe};

/// Drives a resource through discovery, (re)start and liveness polling
///
/// Two simultaneous bring-ups of the same resource race on discovery.
/// Callers serialize them; there is no internal lock.
pub struct ReadinessOrchestrator<'a, R: ?Sized, P: ?Sized, O = NoOpObserver> {
    runtime: &'a R,
    probe: &'a P,
    resource: String,
    dialects: Vec<ComposeDialect>,
    budget: PollBudget,
    observer: O,
}

impl<'a, R, P> ReadinessOrchestrator<'a, R, P, NoOpObserver>
where
    R: ContainerRuntime + ?Sized,
    P: LivenessProbe + ?Sized,
{
    pub fn new(runtime: &'a R, probe: &'a P, resource: impl Into<String>) -> Self {
        Self {
            runtime,
            probe,
            resource: resource.into(),
            dialects: vec![ComposeDialect::V2, ComposeDialect::Legacy],
            budget: PollBudget::default(),
            observer: NoOpObserver,
        }
    }
}

impl<'a, R, P, O> ReadinessOrchestrator<'a, R, P, O>
where
    R: ContainerRuntime + ?Sized,
    P: LivenessProbe + ?Sized,
    O: RetryObserver,
{
    /// Set the liveness polling budget
    pub fn with_budget(mut self, budget: PollBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Set the creation dialects, tried in order
    pub fn with_dialects(mut self, dialects: Vec<ComposeDialect>) -> Self {
        self.dialects = dialects;
        self
    }

    /// Observe liveness probes (one failure event per failed probe)
    pub fn with_observer<O2: RetryObserver>(
        self,
        observer: O2,
    ) -> ReadinessOrchestrator<'a, R, P, O2> {
        ReadinessOrchestrator {
            runtime: self.runtime,
            probe: self.probe,
            resource: self.resource,
            dialects: self.dialects,
            budget: self.budget,
            observer,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Query the runtime for the current state, without probing
    ///
    /// Never returns `Ready`. A runtime that cannot be queried is reported as
    /// `Unreachable`.
    pub async fn discover(&self) -> Result<ResourceState> {
        let running = self
            .runtime
            .is_running(&self.resource)
            .await
            .map_err(|e| self.query_error(e))?;
        let exists = self
            .runtime
            .exists(&self.resource)
            .await
            .map_err(|e| self.query_error(e))?;

        let state = ResourceState::from_queries(running, exists);
        tracing::debug!(
            resource = %self.resource,
            running,
            exists,
            state = %state,
            "discovered resource"
        );
        Ok(state)
    }

    /// Discover the state and, when running, probe once for liveness
    pub async fn inspect(&self) -> Result<ResourceState> {
        let state = self.discover().await?;
        if state != ResourceState::Running {
            return Ok(state);
        }
        match self.probe.probe().await {
            Ok(()) => Ok(ResourceState::Ready),
            Err(e) => {
                tracing::debug!(resource = %self.resource, error = %e, "running but not live");
                Ok(ResourceState::Running)
            }
        }
    }

    /// Bring the resource to `Ready`
    ///
    /// Fails with `Unreachable` if the runtime cannot be queried,
    /// `ResourceStartFailure` if neither starting nor creating works, and
    /// `ReadinessTimeout` if the probe never succeeds within the budget.
    pub async fn ensure_ready(&self) -> Result<ReadinessReport> {
        self.budget.validate()?;
        let started_at = Instant::now();

        let initial_state = self.discover().await?;
        let mut trace = PhaseTrace::new(initial_state.into());

        let action = match initial_state {
            ResourceState::Running | ResourceState::Ready => ReadinessAction::None,
            ResourceState::StoppedExists => {
                tracing::info!(resource = %self.resource, "starting existing resource");
                match self.runtime.start(&self.resource).await {
                    Ok(()) => {
                        trace.advance(BringUpPhase::Starting);
                        ReadinessAction::Started
                    }
                    Err(e) => {
                        tracing::warn!(
                            resource = %self.resource,
                            error = %e,
                            "start in place failed, creating from declaration"
                        );
                        trace.advance(BringUpPhase::Absent);
                        self.create(&mut trace).await?;
                        ReadinessAction::Recreated
                    }
                }
            }
            ResourceState::Absent => {
                self.create(&mut trace).await?;
                ReadinessAction::Created
            }
        };

        trace.advance(BringUpPhase::PollLiveness);
        let probe_attempts = match self.poll_liveness().await {
            Ok(attempts) => attempts,
            Err(e) => {
                trace.advance(BringUpPhase::Failed);
                return Err(e);
            }
        };
        trace.advance(BringUpPhase::Ready);

        tracing::info!(
            resource = %self.resource,
            probes = probe_attempts,
            "resource is ready"
        );

        Ok(ReadinessReport {
            resource: self.resource.clone(),
            initial_state,
            action,
            trace,
            probe_attempts,
            elapsed: started_at.elapsed(),
        })
    }

    /// Probe until success or the budget is exhausted; returns probes made
    ///
    /// A probe whose program is not installed fails at once with
    /// `ToolingMissing`; waiting cannot fix it.
    pub async fn poll_liveness(&self) -> Result<u32> {
        self.budget.validate()?;

        let executor = RetryExecutorBuilder::new()
            .with_policy(self.budget.to_retry_policy())
            .with_predicate(ClosurePredicate::new(|e: &CommandError| !e.is_not_found()))
            .with_observer(&self.observer)
            .build();

        let mut probes = 0u32;
        let outcome = executor
            .execute(|| {
                probes += 1;
                self.probe.probe()
            })
            .await;

        match outcome {
            Ok(()) => Ok(probes),
            Err(e) if e.is_non_retryable() => Err(missing_program(e.inner())),
            Err(e) => {
                let attempts = e.attempts();
                let last_error = e.into_inner().to_string();
                tracing::error!(
                    resource = %self.resource,
                    attempts,
                    last_error = %last_error,
                    "readiness budget exhausted"
                );
                Err(Error::readiness_timeout(&self.resource, attempts, last_error))
            }
        }
    }

    /// A failed runtime query: a missing program is a tooling problem,
    /// anything else means the runtime could not be reached
    fn query_error(&self, error: CommandError) -> Error {
        if error.is_not_found() {
            missing_program(&error)
        } else {
            Error::unreachable(&self.resource, error.to_string())
        }
    }

    async fn create(&self, trace: &mut PhaseTrace) -> Result<()> {
        tracing::info!(resource = %self.resource, "creating resource from declaration");
        let created = first_success(&self.dialects, |dialect| {
            tracing::debug!(dialect = %dialect, "trying compose dialect");
            self.runtime.create(*dialect)
        })
        .await;

        match created {
            Ok(()) => {
                trace.advance(BringUpPhase::Starting);
                Ok(())
            }
            Err(e) => {
                trace.advance(BringUpPhase::Failed);
                Err(Error::resource_start_failure(&self.resource, e.to_string()))
            }
        }
    }
}

fn missing_program(error: &CommandError) -> Error {
    let program = error.command().split_whitespace().next().unwrap_or_default();
    Error::tooling_missing(
        program,
        "Install it, or set container.runtime-command to a compatible CLI.",
    )
}
