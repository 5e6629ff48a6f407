//! Failures of external process invocations
//!
//! The container runtime, the liveness probe and the migration tool are all
//! invoked as opaque processes whose failure is signaled by a non-zero exit
//! status. This type carries enough of the invocation to diagnose it.

use std::process::Output;
use thiserror::Error;

/// An external command that could not be run or exited unsuccessfully
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be spawned (usually not installed)
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited with a failure status
    #[error("`{command}` exited with status {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

impl CommandError {
    /// Build a spawn failure
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Build a failure from a finished process
    pub fn failed(command: impl Into<String>, output: &Output) -> Self {
        let status = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        Self::Failed {
            command: command.into(),
            status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// The command line that failed
    pub fn command(&self) -> &str {
        match self {
            CommandError::Spawn { command, .. } | CommandError::Failed { command, .. } => command,
        }
    }

    /// Whether the program was missing rather than failing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommandError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Convert a finished process into `Ok(output)` or a `Failed` error
pub fn check_output(command: impl Into<String>, output: Output) -> Result<Output, CommandError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(CommandError::failed(command, &output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_spawn_not_found() {
        let err = CommandError::spawn(
            "docker ps",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.is_not_found());
        assert_eq!(err.command(), "docker ps");
        assert!(err.to_string().contains("failed to run `docker ps`"));
    }

    #[test]
    fn test_failed_display() {
        let err = CommandError::Failed {
            command: "docker start db".to_string(),
            status: "1".to_string(),
            stderr: "No such container".to_string(),
        };
        assert!(!err.is_not_found());
        let display = err.to_string();
        assert!(display.contains("status 1"));
        assert!(display.contains("No such container"));
    }
}
