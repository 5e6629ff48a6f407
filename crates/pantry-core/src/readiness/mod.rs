//! Readiness orchestration for the local database container
//!
//! The orchestrator reconciles the three observable states of a named
//! resource (absent, stopped, running) and polls a liveness probe until the
//! resource accepts requests or the polling budget runs out.
//!
//! ```text
//! Absent        --create+start-->                Starting
//! StoppedExists --start-->                       Starting
//! StoppedExists --start fails-->                 Absent (create fresh)
//! Running       -->                              PollLiveness
//! Starting      -->                              PollLiveness
//! PollLiveness  --probe ok-->                    Ready
//! PollLiveness  --probe fails, budget remains--> PollLiveness
//! PollLiveness  --budget exhausted-->            Failed
//! ```

mod orchestrator;
mod state;
mod traits;

pub use orchestrator::ReadinessOrchestrator;
pub use state::{BringUpPhase, PhaseTrace, ReadinessAction, ReadinessReport, ResourceState};
pub use traits::{ContainerRuntime, LivenessProbe};
