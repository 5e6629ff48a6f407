//! Config command

use anyhow::Result;
use camino::Utf8Path;

use crate::cli::ConfigShowArgs;

pub fn show(args: ConfigShowArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let project = super::load_project(config_path)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&project.config)?);
    } else {
        print!("{}", serde_yaml_ng::to_string(&project.config)?);
    }
    Ok(())
}
