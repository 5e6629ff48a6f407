//! # pantry-core
//!
//! Core library for the pantry CLI providing:
//! - Retry execution engine with transient-failure classification
//! - Readiness orchestration for the local database container
//! - Ordered first-success alternatives
//! - Runtime configuration types and the hierarchical loader
//! - Database error classification and the shared pool lifecycle

pub mod alternatives;
pub mod config;
pub mod db;
pub mod error;
pub mod process;
pub mod readiness;
pub mod retry;
pub mod types;

pub use config::ConfigLoader;
pub use error::{Error, Result};
pub use types::RuntimeConfig;
