//! Resource states and bring-up phases

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Observed state of the managed resource
///
/// Derived by querying the runtime on every invocation and never cached.
/// `Ready` additionally requires a successful liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceState {
    Absent,
    StoppedExists,
    Running,
    Ready,
}

impl ResourceState {
    /// Derive the state from the two independent runtime queries
    pub fn from_queries(running: bool, exists: bool) -> Self {
        if running {
            ResourceState::Running
        } else if exists {
            ResourceState::StoppedExists
        } else {
            ResourceState::Absent
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceState::Absent => "absent",
            ResourceState::StoppedExists => "stopped",
            ResourceState::Running => "running",
            ResourceState::Ready => "ready",
        };
        write!(f, "{}", label)
    }
}

/// A step of the bring-up state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BringUpPhase {
    Absent,
    StoppedExists,
    Running,
    Starting,
    PollLiveness,
    Ready,
    Failed,
}

impl BringUpPhase {
    /// Whether the machine may move from `self` to `next`
    ///
    /// The only edge back to `Absent` is the start-failure fallback from
    /// `StoppedExists`. `Ready` and `Failed` are terminal.
    pub fn can_advance_to(self, next: BringUpPhase) -> bool {
        use BringUpPhase::*;
        matches!(
            (self, next),
            (Absent, Starting)
                | (Absent, Failed)
                | (StoppedExists, Starting)
                | (StoppedExists, Absent)
                | (Running, PollLiveness)
                | (Starting, PollLiveness)
                | (PollLiveness, Ready)
                | (PollLiveness, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BringUpPhase::Ready | BringUpPhase::Failed)
    }
}

impl From<ResourceState> for BringUpPhase {
    fn from(state: ResourceState) -> Self {
        match state {
            ResourceState::Absent => BringUpPhase::Absent,
            ResourceState::StoppedExists => BringUpPhase::StoppedExists,
            ResourceState::Running => BringUpPhase::Running,
            ResourceState::Ready => BringUpPhase::Ready,
        }
    }
}

impl fmt::Display for BringUpPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BringUpPhase::Absent => "absent",
            BringUpPhase::StoppedExists => "stopped",
            BringUpPhase::Running => "running",
            BringUpPhase::Starting => "starting",
            BringUpPhase::PollLiveness => "polling",
            BringUpPhase::Ready => "ready",
            BringUpPhase::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// The state-mutating action bring-up performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadinessAction {
    /// Already running, only probed
    None,
    /// Existing resource started in place
    Started,
    /// Resource created from the declaration
    Created,
    /// Start in place failed, created from the declaration instead
    Recreated,
}

/// Ordered record of the phases visited during one bring-up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseTrace {
    phases: Vec<BringUpPhase>,
}

impl PhaseTrace {
    pub fn new(initial: BringUpPhase) -> Self {
        Self {
            phases: vec![initial],
        }
    }

    /// Record the next phase
    pub fn advance(&mut self, next: BringUpPhase) {
        debug_assert!(
            self.current().map_or(true, |current| current.can_advance_to(next)),
            "illegal bring-up transition {:?} -> {:?}",
            self.current(),
            next
        );
        tracing::debug!(phase = %next, "bring-up phase");
        self.phases.push(next);
    }

    pub fn current(&self) -> Option<BringUpPhase> {
        self.phases.last().copied()
    }

    pub fn phases(&self) -> &[BringUpPhase] {
        &self.phases
    }
}

/// Result of a successful bring-up
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub resource: String,
    /// State discovered before any action was taken
    pub initial_state: ResourceState,
    pub action: ReadinessAction,
    pub trace: PhaseTrace,
    /// Liveness probes made, including the successful one
    pub probe_attempts: u32,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_queries() {
        assert_eq!(ResourceState::from_queries(false, false), ResourceState::Absent);
        assert_eq!(
            ResourceState::from_queries(false, true),
            ResourceState::StoppedExists
        );
        assert_eq!(ResourceState::from_queries(true, true), ResourceState::Running);
        // a running resource exists even if the listing lagged
        assert_eq!(ResourceState::from_queries(true, false), ResourceState::Running);
    }

    #[test]
    fn test_terminal_phases_have_no_exits() {
        use BringUpPhase::*;
        let all = [
            Absent,
            StoppedExists,
            Running,
            Starting,
            PollLiveness,
            Ready,
            Failed,
        ];
        for terminal in [Ready, Failed] {
            assert!(terminal.is_terminal());
            for next in all {
                assert!(!terminal.can_advance_to(next));
            }
        }
    }

    #[test]
    fn test_transition_table() {
        use BringUpPhase::*;
        assert!(StoppedExists.can_advance_to(Absent));
        assert!(Running.can_advance_to(PollLiveness));
        assert!(!Running.can_advance_to(Starting));
        assert!(!PollLiveness.can_advance_to(Starting));
        assert!(!Starting.can_advance_to(Absent));
    }

    #[test]
    fn test_trace_records_in_order() {
        let mut trace = PhaseTrace::new(BringUpPhase::StoppedExists);
        trace.advance(BringUpPhase::Absent);
        trace.advance(BringUpPhase::Starting);
        trace.advance(BringUpPhase::PollLiveness);
        trace.advance(BringUpPhase::Ready);

        assert_eq!(trace.current(), Some(BringUpPhase::Ready));
        assert_eq!(trace.phases().len(), 5);
    }
}
