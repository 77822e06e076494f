//! # costlens-core
//!
//! Foundation crate for the costlens inference cost analyzer.
//! Defines the finding model, errors, config, tracing setup, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::{CostlensConfig, ScanConfig};
pub use errors::error_code::CostlensErrorCode;
pub use errors::{ConfigError, ScanError};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::finding::{Finding, FindingKind, Remediation, Service, Severity};
