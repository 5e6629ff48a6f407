//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Pantry - bring up the local database and keep its schema in sync
#[derive(Parser, Debug)]
#[command(name = "pantry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to pantry.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring up the database, write the env file and sync the schema
    Setup(SetupArgs),

    /// Show the database container state
    Status(StatusArgs),

    /// Wait until the database answers its liveness probe
    Wait(WaitArgs),

    /// Database commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Check required tooling
    Doctor,
}

// Setup command
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Push the schema directly if applying migrations fails
    #[arg(long)]
    pub allow_push_fallback: bool,

    /// Skip schema sync and client generation
    #[arg(long)]
    pub skip_schema: bool,
}

// Status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Wait command
#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Maximum number of liveness probes
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Delay between probes in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

// Db commands
#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Run `SELECT 1` through the shared pool
    Ping,
}

// Config commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration
    Show(ConfigShowArgs),
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
