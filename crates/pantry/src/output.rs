//! Terminal output utilities

use std::error::Error;
use std::io::Write;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use pantry_core::retry::RetryObserver;
use pantry_runtime::{SetupReporter, SetupStep};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Create a spinner
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(spinner_style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints a dot for every failed liveness probe
///
/// The line is closed when polling ends either way.
pub struct DotProgress;

impl DotProgress {
    fn dot(&self) {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "{}", ".".dimmed());
        let _ = stdout.flush();
    }
}

impl RetryObserver for DotProgress {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(
        &self,
        _attempt: u32,
        _max_attempts: u32,
        _error: &dyn Error,
        _delay: Duration,
    ) {
        self.dot();
    }

    fn on_success(&self, attempt: u32, _total_duration: Duration) {
        if attempt > 1 {
            println!();
        }
    }

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Error) {
        println!();
    }
}

/// Prints each setup step as it starts and finishes
pub struct StepReporter;

impl SetupReporter for StepReporter {
    fn step_started(&self, step: SetupStep) {
        println!("{} {}...", style("→").cyan().bold(), step);
    }

    fn step_finished(&self, _step: SetupStep, detail: &str) {
        success(detail);
    }
}
