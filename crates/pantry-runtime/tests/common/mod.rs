//! Common test helpers for pantry-runtime integration tests
//!
//! Every mock records its calls into a shared `CallLog` so tests can assert
//! the exact order of interactions across collaborators.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use pantry_core::process::CommandError;
use pantry_core::readiness::{ContainerRuntime, LivenessProbe};
use pantry_core::types::ComposeDialect;
use pantry_core::RuntimeConfig;
use pantry_runtime::{Prerequisite, PrerequisiteStatus, SchemaTool, ToolingCheck};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ─── Call recording ─────────────────────────────────────────────────────────

/// Ordered record of collaborator calls
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn assert_called(&self, call: &str) {
        let calls = self.calls();
        assert!(
            calls.iter().any(|c| c == call),
            "'{}' was never called. Actual calls: {:?}",
            call,
            calls
        );
    }

    #[allow(dead_code)]
    pub fn assert_not_called(&self, prefix: &str) {
        let calls = self.calls();
        assert!(
            !calls.iter().any(|c| c.starts_with(prefix)),
            "'{}' was called but should not have been. Actual calls: {:?}",
            prefix,
            calls
        );
    }

    /// Position of the first call, for ordering assertions
    #[allow(dead_code)]
    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }
}

fn failed(command: &str) -> CommandError {
    CommandError::Failed {
        command: command.to_string(),
        status: "1".to_string(),
        stderr: format!("{} failed", command),
    }
}

// ─── Collaborator mocks ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum ContainerSetup {
    Absent,
    Stopped,
    Running,
}

pub struct MockRuntime {
    pub log: CallLog,
    pub setup: ContainerSetup,
    pub start_fails: bool,
    pub create_fails: bool,
}

impl MockRuntime {
    pub fn new(log: &CallLog, setup: ContainerSetup) -> Self {
        Self {
            log: log.clone(),
            setup,
            start_fails: false,
            create_fails: false,
        }
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn is_running(&self, _name: &str) -> Result<bool, CommandError> {
        self.log.record("runtime.is_running");
        Ok(self.setup == ContainerSetup::Running)
    }

    async fn exists(&self, _name: &str) -> Result<bool, CommandError> {
        self.log.record("runtime.exists");
        Ok(self.setup != ContainerSetup::Absent)
    }

    async fn start(&self, _name: &str) -> Result<(), CommandError> {
        self.log.record("runtime.start");
        if self.start_fails {
            Err(failed("docker start"))
        } else {
            Ok(())
        }
    }

    async fn create(&self, dialect: ComposeDialect) -> Result<(), CommandError> {
        self.log.record(format!("runtime.create {}", dialect));
        if self.create_fails {
            Err(failed("compose up -d"))
        } else {
            Ok(())
        }
    }
}

/// Probe that fails `failures` times, then succeeds (`None` = never)
pub struct MockProbe {
    pub log: CallLog,
    failures: Option<u32>,
    calls: AtomicU32,
}

impl MockProbe {
    pub fn new(log: &CallLog, failures: Option<u32>) -> Self {
        Self {
            log: log.clone(),
            failures,
            calls: AtomicU32::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LivenessProbe for MockProbe {
    async fn probe(&self) -> Result<(), CommandError> {
        self.log.record("probe");
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures {
            Some(n) if call >= n => Ok(()),
            _ => Err(failed("pg_isready")),
        }
    }
}

pub struct MockSchemaTool {
    pub log: CallLog,
    pub has_migrations: bool,
    pub apply_fails: bool,
    pub push_fails: bool,
    pub generate_fails: bool,
}

impl MockSchemaTool {
    pub fn new(log: &CallLog, has_migrations: bool) -> Self {
        Self {
            log: log.clone(),
            has_migrations,
            apply_fails: false,
            push_fails: false,
            generate_fails: false,
        }
    }
}

#[async_trait]
impl SchemaTool for MockSchemaTool {
    fn has_migrations(&self) -> bool {
        self.has_migrations
    }

    async fn apply_migrations(&self) -> Result<(), CommandError> {
        self.log.record("schema.apply");
        if self.apply_fails {
            Err(failed("migrate deploy"))
        } else {
            Ok(())
        }
    }

    async fn push_schema(&self, accept_data_loss: bool) -> Result<(), CommandError> {
        self.log
            .record(format!("schema.push accept_data_loss={}", accept_data_loss));
        if self.push_fails {
            Err(failed("db push"))
        } else {
            Ok(())
        }
    }

    async fn generate_client(&self) -> Result<(), CommandError> {
        self.log.record("schema.generate");
        if self.generate_fails {
            Err(failed("generate"))
        } else {
            Ok(())
        }
    }
}

pub struct MockTooling {
    pub log: CallLog,
    pub missing: Vec<&'static str>,
}

impl MockTooling {
    pub fn available(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            missing: Vec::new(),
        }
    }

    #[allow(dead_code)]
    pub fn missing(log: &CallLog, tools: &[&'static str]) -> Self {
        Self {
            log: log.clone(),
            missing: tools.to_vec(),
        }
    }
}

#[async_trait]
impl ToolingCheck for MockTooling {
    async fn check(&self) -> PrerequisiteStatus {
        self.log.record("tooling.check");
        let to_prerequisite = |name: &str| Prerequisite {
            name: name.to_string(),
            description: name.to_string(),
            install_hint: Some(format!("Install {}", name)),
            version: None,
        };
        PrerequisiteStatus {
            satisfied: self.missing.is_empty(),
            missing: self.missing.iter().map(|n| to_prerequisite(n)).collect(),
            available: Vec::new(),
        }
    }
}

// ─── Fixtures ───────────────────────────────────────────────────────────────

/// Temporary project directory with default configuration
pub struct Project {
    pub dir: TempDir,
    pub config: RuntimeConfig,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            config: RuntimeConfig::default(),
        }
    }

    pub fn path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).expect("Invalid UTF-8 path")
    }
}
