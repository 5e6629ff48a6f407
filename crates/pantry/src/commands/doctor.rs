//! Doctor command

use anyhow::{anyhow, Result};
use camino::Utf8Path;
use pantry_runtime::{HostTooling, ToolingCheck};

use crate::output;

pub async fn run(config_path: Option<&Utf8Path>) -> Result<()> {
    let project = super::load_project(config_path)?;
    let config = &project.config;

    let spinner = output::spinner("Checking tooling...");
    let status = HostTooling::new(&config.container)
        .with_schema_tool(&config.schema)
        .check()
        .await;
    spinner.finish_and_clear();

    output::header("Tooling");
    for tool in &status.available {
        let version = tool.version.as_deref().unwrap_or("unknown version");
        output::success(&format!("{} ({})", tool.description, version));
    }
    for tool in &status.missing {
        output::error(&tool.description);
        if let Some(hint) = &tool.install_hint {
            output::kv("Install", hint);
        }
    }

    if status.satisfied {
        println!();
        output::success("All required tooling is available");
        Ok(())
    } else {
        Err(anyhow!("{} required tool(s) missing", status.missing.len()))
    }
}
