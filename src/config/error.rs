//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or querying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required configuration file is absent.
    #[error("required configuration file missing: {path}")]
    MissingFile { path: PathBuf },

    /// The requested style is not configured.
    #[error("style not found: {0}")]
    StyleNotFound(String),

    /// A style is configured but unusable.
    #[error("invalid style '{style}': {reason}")]
    InvalidStyle { style: String, reason: String },
}
