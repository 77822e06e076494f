//! Scanner inputs and outputs.

use std::path::PathBuf;

use costlens_core::Finding;
use serde::{Deserialize, Serialize};

/// Estimated file count above which a scan carries a warning.
pub const LARGE_SCAN_FILES: usize = 1000;
/// Estimated total size above which a scan carries a warning.
pub const LARGE_SCAN_BYTES: u64 = 100 * 1024 * 1024;

/// A file selected by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Pre-scan size estimate. Nothing is read or analysed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEstimate {
    pub file_count: usize,
    pub total_size_bytes: u64,
    pub skipped_directories: usize,
}

impl ScanEstimate {
    pub fn is_large(&self) -> bool {
        self.file_count > LARGE_SCAN_FILES || self.total_size_bytes > LARGE_SCAN_BYTES
    }
}

/// Attached to a report whose estimate crossed the large-scan thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub message: String,
    pub file_count: usize,
    pub total_size_bytes: u64,
    pub suggestion: String,
}

impl ScanWarning {
    pub fn from_estimate(estimate: &ScanEstimate) -> Self {
        Self {
            message: "Large scan detected".to_string(),
            file_count: estimate.file_count,
            total_size_bytes: estimate.total_size_bytes,
            suggestion: "Consider setting max_files or adding more skip_dirs".to_string(),
        }
    }
}

/// Result of scanning a directory tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub files_scanned: usize,
    pub total_findings: usize,
    /// Per-file detector output in path order, then correlation findings.
    pub findings: Vec<Finding>,
    /// Findings added by cross-service correlation.
    pub cross_cutting_count: usize,
    pub skipped_directories: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ScanWarning>,
    pub duration_ms: u64,
}
