//! Scan-level errors.

use std::path::PathBuf;

use super::error_code::{self, CostlensErrorCode};

/// Errors that can abort a whole scan. Per-file problems never surface here;
/// they degrade to zero findings for that file.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan root does not exist: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("Scan root is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("I/O error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("Scan cancelled")]
    Cancelled,
}

impl CostlensErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RootNotFound { .. } => error_code::ROOT_NOT_FOUND,
            Self::NotADirectory { .. } => error_code::NOT_A_DIRECTORY,
            Self::Cancelled => error_code::SCAN_CANCELLED,
            Self::Io { .. } => error_code::SCAN_ERROR,
        }
    }
}
