//! Error types for the costlens workspace.
//!
//! The detection core itself never fails; these cover file discovery,
//! orchestration, and configuration loading.

pub mod config_error;
pub mod error_code;
pub mod scan_error;

pub use config_error::ConfigError;
pub use scan_error::ScanError;
