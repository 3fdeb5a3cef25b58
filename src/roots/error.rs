//! Root-management errors.

use thiserror::Error;

/// Errors raised while loading, generating, or persisting root vocabulary.
#[derive(Debug, Error)]
pub enum RootsError {
    /// YAML parsing or serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A style has no root-category definitions configured.
    #[error("style '{0}' has no root categories configured")]
    NoCategories(String),

    /// A root file exists but does not have the expected shape.
    #[error("malformed root file for style '{style}': {reason}")]
    MalformedFile { style: String, reason: String },
}
