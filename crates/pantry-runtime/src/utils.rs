//! Utility functions for process-backed adapters

use camino::Utf8Path;
use pantry_core::process::{check_output, CommandError};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Check if a command is available in PATH
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Render a program and its arguments as a single command line
pub fn command_line<S: AsRef<str>>(cmd: &str, args: &[S]) -> String {
    std::iter::once(cmd)
        .chain(args.iter().map(AsRef::as_ref))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Get command version
///
/// Some tools print their version to stderr, so that is used when stdout is
/// empty.
pub async fn get_command_version(
    cmd: &str,
    version_args: &[&str],
) -> Result<String, CommandError> {
    let output = run_command_async(cmd, version_args, None).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let version = if stdout.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        stdout.trim().to_string()
    };
    Ok(version.lines().next().unwrap_or_default().to_string())
}

/// Run a command asynchronously, failing on a non-zero exit status
///
/// Output is captured; stdin is closed.
pub async fn run_command_async<S: AsRef<str>>(
    cmd: &str,
    args: &[S],
    cwd: Option<&Utf8Path>,
) -> Result<Output, CommandError> {
    let line = command_line(cmd, args);
    debug!("Running async: {}", line);

    let mut command = Command::new(cmd);
    command
        .args(args.iter().map(AsRef::as_ref))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .await
        .map_err(|e| CommandError::spawn(&line, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("Command exited non-zero: {}\nStderr: {}", line, stderr.trim());
    }

    check_output(line, output)
}

/// Whether any line of the output is exactly `name`
pub fn lists_name(output: &Output, name: &str) -> bool {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .any(|line| line.trim() == name)
}
