use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("{tool} binary not found: {path}")]
    ToolNotFound { tool: &'static str, path: PathBuf },

    #[error("Profile not found: {0}")]
    ProfileNotFound(PathBuf),

    #[error("No raw files or directories to convert")]
    NoInputs,

    #[error("Invalid resize spec: {0}")]
    InvalidResize(String),

    #[error("Invalid color matrix: {0}")]
    InvalidMatrix(String),

    #[error("Invalid include filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Failed to launch {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} reported an error: {message}")]
    ToolReportedError { tool: &'static str, message: String },

    #[error("{tool} exited without producing {path}")]
    MissingArtifact { tool: &'static str, path: PathBuf },

    #[error("{tool} timed out after {after:?}")]
    Timeout { tool: &'static str, after: Duration },

    #[error("Failed to decode intermediate image: {0}")]
    DecodeError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConversionError {
    /// Errors that abort the whole run before any job is started.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ConversionError::ToolNotFound { .. }
                | ConversionError::ProfileNotFound(_)
                | ConversionError::NoInputs
                | ConversionError::InvalidResize(_)
                | ConversionError::InvalidMatrix(_)
                | ConversionError::InvalidFilter(_)
                | ConversionError::InvalidSetting(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
