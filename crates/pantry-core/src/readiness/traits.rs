//! Collaborators the orchestrator drives

use async_trait::async_trait;

use crate::process::CommandError;
use crate::types::ComposeDialect;

/// Container runtime operations for one named resource
///
/// Each call is an external process whose failure is a non-zero exit status.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Whether a resource with this name is currently running
    async fn is_running(&self, name: &str) -> Result<bool, CommandError>;

    /// Whether a resource with this name exists, running or stopped
    async fn exists(&self, name: &str) -> Result<bool, CommandError>;

    /// Start an existing, stopped resource in place
    async fn start(&self, name: &str) -> Result<(), CommandError>;

    /// Create and start the resource from its declaration
    ///
    /// Idempotent: safe to invoke on a partially created resource.
    async fn create(&self, dialect: ComposeDialect) -> Result<(), CommandError>;
}

/// Lightweight health check against the resource itself
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Succeeds once the resource accepts requests
    async fn probe(&self) -> Result<(), CommandError>;
}
