//! Configuration errors.

use std::path::PathBuf;

use super::error_code::{self, CostlensErrorCode};

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to parse config {}: {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl CostlensErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => error_code::CONFIG_NOT_FOUND,
            Self::InvalidValue { .. } => error_code::CONFIG_INVALID,
            Self::ParseError { .. } => error_code::CONFIG_ERROR,
        }
    }
}
