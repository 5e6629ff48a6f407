//! Pantry CLI - local database bring-up
//!
//! This is the main entry point for the pantry command-line interface.

mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands, ConfigCommands, DbCommands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Setup(args) => commands::setup::run(args, config_path).await,
        Commands::Status(args) => commands::status::run(args, config_path).await,
        Commands::Wait(args) => commands::wait::run(args, config_path).await,
        Commands::Db(DbCommands::Ping) => commands::db::ping(config_path).await,
        Commands::Config(ConfigCommands::Show(args)) => commands::config::show(args, config_path),
        Commands::Doctor => commands::doctor::run(config_path).await,
    };

    if let Err(e) = result {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Step progress is printed by the commands; logs stay quiet
            // unless asked for.
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
