//! Type definitions shared across pantry crates

mod runtime_config;

pub use runtime_config::{
    ComposeDialect, ContainerConfig, DatabaseConfig, EnvFileConfig, PollBudget, RetryPolicy,
    RetryStrategy, RuntimeConfig, SchemaConfig,
};
