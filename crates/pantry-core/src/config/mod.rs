//! Configuration loading and management

mod loader;

pub use loader::{ConfigLoader, PROJECT_CONFIG_FILE};
