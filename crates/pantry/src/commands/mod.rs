//! CLI command implementations

pub mod config;
pub mod db;
pub mod doctor;
pub mod setup;
pub mod status;
pub mod wait;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use pantry_core::{ConfigLoader, RuntimeConfig};

/// Resolved configuration plus the directory it applies to
pub struct Project {
    pub config: RuntimeConfig,
    pub dir: Utf8PathBuf,
}

/// Load configuration from the current directory or an explicit file
pub fn load_project(config_path: Option<&Utf8Path>) -> Result<Project> {
    let mut loader = ConfigLoader::new()?;
    if let Some(path) = config_path {
        loader = loader.with_file(path.to_path_buf());
    }
    let config = loader.load().with_context(|| match loader.project_file() {
        Some(path) => format!("Failed to load configuration from {}", path),
        None => "Failed to load embedded configuration".to_string(),
    })?;
    Ok(Project {
        config,
        dir: loader.project_dir().to_path_buf(),
    })
}
