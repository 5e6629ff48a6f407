//! Runtime configuration types for operational parameters
//!
//! These types define configuration that controls the bring-up flow: which
//! container to manage, how to reach the database, how long to wait for it,
//! how to retry data operations, and how the schema is synchronized.

use crate::error::{Error, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Database container settings
    #[serde(default)]
    pub container: ContainerConfig,

    /// Connection parameters
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Readiness polling budget used during bring-up
    #[serde(default)]
    pub readiness: PollBudget,

    /// Retry policy for data operations
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Schema synchronization settings
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Connection-configuration file materialized on first run
    #[serde(default)]
    pub env_file: EnvFileConfig,
}

impl RuntimeConfig {
    /// Check every invariant the loaders cannot express through serde
    pub fn validate(&self) -> Result<()> {
        self.retry.validate()?;
        self.readiness.validate()?;
        if self.container.name.trim().is_empty() {
            return Err(Error::invalid_config("container.name must not be empty"));
        }
        if self.container.compose_dialects.is_empty() {
            return Err(Error::invalid_config(
                "container.compose-dialects must list at least one dialect",
            ));
        }
        Ok(())
    }
}

/// Database container configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContainerConfig {
    /// Container name used for discovery, start and exec
    #[serde(default = "default_container_name")]
    pub name: String,

    /// Container runtime executable
    #[serde(default = "default_runtime_command")]
    pub runtime_command: String,

    /// Compose file passed to the compose dialects (defaults to the
    /// compose tool's own lookup in the working directory)
    #[serde(default)]
    pub compose_file: Option<Utf8PathBuf>,

    /// Compose invocation dialects, tried in order
    #[serde(default = "default_compose_dialects")]
    pub compose_dialects: Vec<ComposeDialect>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: default_container_name(),
            runtime_command: default_runtime_command(),
            compose_file: None,
            compose_dialects: default_compose_dialects(),
        }
    }
}

fn default_container_name() -> String {
    "nutrition-tracker-db".to_string()
}
fn default_runtime_command() -> String {
    "docker".to_string()
}
fn default_compose_dialects() -> Vec<ComposeDialect> {
    vec![ComposeDialect::V2, ComposeDialect::Legacy]
}

/// A command-line dialect of the declarative bring-up tool
///
/// Both dialects perform the same operation; they differ only in how the
/// compose tool is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComposeDialect {
    /// `docker compose ...` (compose plugin)
    V2,
    /// `docker-compose ...` (standalone binary)
    Legacy,
}

impl ComposeDialect {
    /// Program and leading arguments for this dialect
    pub fn invocation(&self, runtime_command: &str) -> (String, Vec<String>) {
        match self {
            ComposeDialect::V2 => (runtime_command.to_string(), vec!["compose".to_string()]),
            ComposeDialect::Legacy => (format!("{}-compose", runtime_command), Vec::new()),
        }
    }

    /// Arguments that print the tool version, used for availability checks
    pub fn version_args(&self) -> &'static [&'static str] {
        match self {
            ComposeDialect::V2 => &["version"],
            ComposeDialect::Legacy => &["--version"],
        }
    }
}

impl std::fmt::Display for ComposeDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComposeDialect::V2 => write!(f, "compose v2"),
            ComposeDialect::Legacy => write!(f, "legacy compose"),
        }
    }
}

/// Database connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DatabaseConfig {
    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default = "default_db_password")]
    pub password: String,

    /// Database name
    #[serde(default = "default_db_name")]
    pub name: String,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Postgres schema appended to the connection URL
    #[serde(default = "default_db_schema")]
    pub schema: String,

    /// How long to wait for a pooled connection, in milliseconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_ms: u64,

    /// Server-side `statement_timeout` for pooled sessions, in milliseconds
    /// (0 disables it)
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: default_db_user(),
            password: default_db_password(),
            name: default_db_name(),
            host: default_db_host(),
            port: default_db_port(),
            schema: default_db_schema(),
            acquire_timeout_ms: default_acquire_timeout(),
            statement_timeout_ms: default_statement_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// Connection URL built from the configured parameters
    pub fn url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}?schema={}",
            self.user, self.password, self.host, self.port, self.name, self.schema
        )
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

fn default_db_user() -> String {
    "nutrition_user".to_string()
}
fn default_db_password() -> String {
    "nutrition_password".to_string()
}
fn default_db_name() -> String {
    "nutrition_tracker".to_string()
}
fn default_db_host() -> String {
    "localhost".to_string()
}
fn default_db_port() -> u16 {
    5432
}
fn default_db_schema() -> String {
    "public".to_string()
}
fn default_acquire_timeout() -> u64 {
    10_000
}
fn default_statement_timeout() -> u64 {
    30_000
}

/// Readiness polling budget
///
/// The interval is fixed: liveness during startup is expected to resolve
/// quickly and uniformly, so the delay does not grow between probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PollBudget {
    /// Maximum number of liveness probes
    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,

    /// Delay between probes in milliseconds
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,
}

impl Default for PollBudget {
    fn default() -> Self {
        Self {
            max_attempts: default_poll_attempts(),
            interval_ms: default_poll_interval(),
        }
    }
}

impl PollBudget {
    /// Create a validated budget
    pub fn new(max_attempts: u32, interval: Duration) -> Result<Self> {
        let budget = Self {
            max_attempts,
            interval_ms: millis(interval, "readiness.interval-ms")?,
        };
        budget.validate()?;
        Ok(budget)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_config(
                "readiness.max-attempts must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Equivalent fixed-delay retry policy
    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            strategy: RetryStrategy::FixedDelay,
            base_delay_ms: self.interval_ms,
        }
    }
}

/// Whole milliseconds of `duration`, rejecting values that overflow `u64`
fn millis(duration: Duration, key: &str) -> Result<u64> {
    u64::try_from(duration.as_millis())
        .map_err(|_| Error::invalid_config(format!("{} is too large", key)))
}

fn default_poll_attempts() -> u32 {
    30
}
fn default_poll_interval() -> u64 {
    1000
}

/// Retry policy for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Retry strategy
    #[serde(default)]
    pub strategy: RetryStrategy,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            strategy: RetryStrategy::default(),
            base_delay_ms: default_base_delay(),
        }
    }
}

impl RetryPolicy {
    /// Create a validated exponential-backoff policy
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Result<Self> {
        let policy = Self {
            max_attempts,
            strategy: RetryStrategy::ExponentialBackoff,
            base_delay_ms: millis(base_delay, "retry.base-delay-ms")?,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Create a validated fixed-delay policy
    pub fn fixed(max_attempts: u32, delay: Duration) -> Result<Self> {
        let policy = Self {
            max_attempts,
            strategy: RetryStrategy::FixedDelay,
            base_delay_ms: millis(delay, "retry.base-delay-ms")?,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_config("retry.max-attempts must be at least 1"));
        }
        Ok(())
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay() -> u64 {
    1000
}

/// Retry strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetryStrategy {
    /// Same delay before every retry
    FixedDelay,

    /// Delay doubles after every failed attempt (default)
    #[default]
    ExponentialBackoff,
}

/// Schema synchronization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaConfig {
    /// Migration tool executable
    #[serde(default = "default_schema_command")]
    pub command: String,

    /// Arguments placed before every subcommand
    #[serde(default = "default_schema_args")]
    pub args: Vec<String>,

    /// Directory holding migration folders
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: Utf8PathBuf,

    /// Push the schema directly when applying migrations fails.
    /// Pushing may drop data, so this is off unless asked for.
    #[serde(default)]
    pub allow_push_fallback: bool,

    /// Pass the data-loss acknowledgement to direct schema pushes
    #[serde(default)]
    pub accept_data_loss: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            command: default_schema_command(),
            args: default_schema_args(),
            migrations_dir: default_migrations_dir(),
            allow_push_fallback: false,
            accept_data_loss: false,
        }
    }
}

fn default_schema_command() -> String {
    "npx".to_string()
}
fn default_schema_args() -> Vec<String> {
    vec!["prisma".to_string()]
}
fn default_migrations_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("prisma/migrations")
}

/// Connection-configuration file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnvFileConfig {
    #[serde(default = "default_env_path")]
    pub path: Utf8PathBuf,

    /// Emit empty placeholders for optional third-party keys
    #[serde(default = "default_include_optional")]
    pub include_optional_keys: bool,
}

impl Default for EnvFileConfig {
    fn default() -> Self {
        Self {
            path: default_env_path(),
            include_optional_keys: default_include_optional(),
        }
    }
}

fn default_env_path() -> Utf8PathBuf {
    Utf8PathBuf::from(".env")
}
fn default_include_optional() -> bool {
    true
}
