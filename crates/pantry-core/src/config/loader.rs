//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Project config (`pantry.yaml` in the project directory, or an explicit path)
//! 3. Environment variables (PANTRY_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::{Mapping, Value};
use std::env;
use std::fs;

/// File name looked up in the project directory
pub const PROJECT_CONFIG_FILE: &str = "pantry.yaml";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Configuration hierarchy loader
pub struct ConfigLoader {
    /// Directory searched for `pantry.yaml`
    project_dir: Utf8PathBuf,

    /// Explicit config file; must exist when set
    explicit_file: Option<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a loader rooted at the current directory
    pub fn new() -> Result<Self> {
        let cwd = env::current_dir()?;
        let project_dir = Utf8PathBuf::from_path_buf(cwd).map_err(|p| {
            Error::invalid_config(format!("Current directory is not valid UTF-8: {}", p.display()))
        })?;
        Ok(Self::with_dir(project_dir))
    }

    /// Create a loader with a custom project directory
    pub fn with_dir(project_dir: Utf8PathBuf) -> Self {
        Self {
            project_dir,
            explicit_file: None,
        }
    }

    /// Read this file instead of `pantry.yaml`
    pub fn with_file(mut self, path: Utf8PathBuf) -> Self {
        self.explicit_file = Some(path);
        self
    }

    /// The project config file that `load` would read, if any
    pub fn project_file(&self) -> Option<Utf8PathBuf> {
        match &self.explicit_file {
            Some(path) => Some(path.clone()),
            None => {
                let path = self.project_dir.join(PROJECT_CONFIG_FILE);
                path.exists().then_some(path)
            }
        }
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load(&self) -> Result<RuntimeConfig> {
        // Start with embedded defaults
        let mut merged = Self::load_embedded_value("runtime-defaults.yaml")?;

        if let Some(path) = self.project_file() {
            if !path.exists() {
                return Err(Error::config_not_found(path.as_str()));
            }
            tracing::debug!(path = %path, "loading project config");
            let overlay = Self::load_yaml_value(&path)?;
            merge_values(&mut merged, overlay);
        }

        let config: RuntimeConfig = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("Failed to parse configuration: {}", e)))?;

        let config = Self::apply_env_overrides(config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load an embedded configuration file as a YAML tree
    fn load_embedded_value(filename: &str) -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    fn load_yaml_value(path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        // An empty file parses as null
        Ok(match value {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        })
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("PANTRY_CONTAINER_NAME") {
            config.container.name = val;
        }

        if let Ok(val) = env::var("PANTRY_RUNTIME_COMMAND") {
            config.container.runtime_command = val;
        }

        // Readiness budget
        if let Ok(val) = env::var("PANTRY_READINESS_MAX_ATTEMPTS") {
            config.readiness.max_attempts = val.parse().map_err(|_| {
                Error::invalid_config("PANTRY_READINESS_MAX_ATTEMPTS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("PANTRY_READINESS_INTERVAL_MS") {
            config.readiness.interval_ms = val.parse().map_err(|_| {
                Error::invalid_config("PANTRY_READINESS_INTERVAL_MS must be a valid number")
            })?;
        }

        // Data-operation retry policy
        if let Ok(val) = env::var("PANTRY_RETRY_MAX_ATTEMPTS") {
            config.retry.max_attempts = val.parse().map_err(|_| {
                Error::invalid_config("PANTRY_RETRY_MAX_ATTEMPTS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("PANTRY_RETRY_BASE_DELAY_MS") {
            config.retry.base_delay_ms = val.parse().map_err(|_| {
                Error::invalid_config("PANTRY_RETRY_BASE_DELAY_MS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("PANTRY_ALLOW_PUSH_FALLBACK") {
            config.schema.allow_push_fallback = parse_flag(&val).ok_or_else(|| {
                Error::invalid_config("PANTRY_ALLOW_PUSH_FALLBACK must be true or false")
            })?;
        }

        if let Ok(val) = env::var("PANTRY_ENV_FILE") {
            config.env_file.path = Utf8PathBuf::from(val);
        }

        Ok(config)
    }

    pub fn project_dir(&self) -> &Utf8Path {
        &self.project_dir
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Recursively overlay `overlay` onto `base`
///
/// Mappings merge key by key; any other value (including sequences) replaces
/// the base value wholesale.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
