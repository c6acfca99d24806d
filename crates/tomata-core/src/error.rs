//! Error types for tomata-core.
//!
//! The session engine itself has no error path: invalid commands are
//! absorbed as no-ops. Errors only arise from configuration handling.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The platform config directory could not be determined
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}
