//! Error types for the documentation generator

use std::path::PathBuf;

use thiserror::Error;

/// Result type for documentation generation
pub type Result<T> = std::result::Result<T, DocError>;

/// Documentation generator errors
///
/// Every variant is fatal for the run that produced it.
#[derive(Error, Debug)]
pub enum DocError {
    #[error("Malformed schema {schema}: {message}")]
    Extraction { schema: String, message: String },

    #[error("Failed to render schema {schema} in package '{package}': {message}")]
    Render {
        schema: String,
        package: String,
        message: String,
    },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid definitions document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Target {} is not empty and was not produced by a previous run", path.display())]
    TargetNotOwned { path: PathBuf },

    #[error(
        "Target {} contains the package being documented ({})",
        target.display(),
        package.display()
    )]
    TargetContainsPackage { target: PathBuf, package: PathBuf },

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl DocError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn extraction(schema: impl Into<String>, message: impl Into<String>) -> Self {
        DocError::Extraction {
            schema: schema.into(),
            message: message.into(),
        }
    }
}
