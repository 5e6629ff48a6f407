//! Process-backed adapters for pantry
//!
//! This crate connects the pantry-core abstractions to real tools:
//!
//! - Docker container runtime (`docker ps`, `docker start`, `compose up -d`)
//! - `pg_isready` liveness probe executed inside the container
//! - Migration CLI (apply, push, generate)
//! - Host tooling detection
//! - Env file templates
//! - The end-to-end setup flow

pub mod docker;
pub mod env_file;
pub mod prerequisites;
pub mod probe;
pub mod schema;
pub mod setup;
pub mod templates;
mod utils;

pub use docker::DockerRuntime;
pub use env_file::{ensure_env_file, EnvFileOutcome};
pub use prerequisites::{HostTooling, Prerequisite, PrerequisiteStatus, ToolingCheck};
pub use probe::PgIsReadyProbe;
pub use schema::{generate_client, sync_schema, MigrationCli, SchemaOutcome, SchemaTool};
pub use setup::{SetupFlow, SetupReport, SetupReporter, SetupStep, SilentReporter};
