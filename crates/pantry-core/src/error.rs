//! Error types for pantry-core

use thiserror::Error;

/// Result type alias using pantry-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for pantry
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format or value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required external tool is not installed
    #[error("{tool} is not installed. {hint}")]
    ToolingMissing { tool: String, hint: String },

    /// The container runtime could not be queried at all
    #[error("Could not reach the container runtime while looking up '{resource}': {message}")]
    Unreachable { resource: String, message: String },

    /// Neither starting nor recreating the resource worked
    #[error("Failed to start '{resource}': {message}")]
    ResourceStartFailure { resource: String, message: String },

    /// The resource came up but never answered its liveness probe
    #[error("'{resource}' did not become ready after {attempts} attempts (last probe: {last_error})")]
    ReadinessTimeout {
        resource: String,
        attempts: u32,
        last_error: String,
    },

    /// A schema-tool step failed
    #[error("Schema step '{step}' failed: {message}")]
    Migration { step: String, message: String },

    /// No database URL could be found
    #[error("DATABASE_URL environment variable is missing. {hint}")]
    DatabaseUrlMissing { hint: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a tooling missing error
    pub fn tooling_missing(tool: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ToolingMissing {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    /// Create an unreachable runtime error
    pub fn unreachable(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreachable {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create a resource start failure
    pub fn resource_start_failure(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResourceStartFailure {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create a readiness timeout error
    pub fn readiness_timeout(
        resource: impl Into<String>,
        attempts: u32,
        last_error: impl Into<String>,
    ) -> Self {
        Self::ReadinessTimeout {
            resource: resource.into(),
            attempts,
            last_error: last_error.into(),
        }
    }

    /// Create a schema step error
    pub fn migration(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Migration {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Whether this is a readiness timeout (as opposed to an unreachable runtime)
    pub fn is_readiness_timeout(&self) -> bool {
        matches!(self, Self::ReadinessTimeout { .. })
    }
}
