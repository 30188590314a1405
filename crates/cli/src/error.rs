//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Input could not be opened
    #[error("Failed to open input {path}: {source}")]
    InputOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A fan-out write failed
    #[error("Write failed after {bytes} bytes: {source}")]
    WriteFailed {
        bytes: u64,
        #[source]
        source: contracts::ContractError,
    },

    /// Run exceeded its timeout
    #[error("Timed out after {secs}s")]
    Timeout { secs: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn input_open(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::InputOpen {
            path: path.into(),
            source,
        }
    }

    pub fn write_failed(bytes: u64, source: contracts::ContractError) -> Self {
        Self::WriteFailed { bytes, source }
    }
}
