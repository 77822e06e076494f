//! Scanner configuration.

use serde::{Deserialize, Serialize};

/// Default maximum file size: 5MB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Extensions analysed when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["py", "ts", "tsx", "js", "jsx"];

/// Configuration for file discovery and the scan orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum file size in bytes. Default: 5MB.
    pub max_file_size: Option<u64>,
    /// Stop discovery after this many files. Default: unlimited.
    pub max_files: Option<usize>,
    /// Worker threads. 0 = rayon default.
    pub threads: Option<usize>,
    /// File extensions (without the dot) to analyse.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Directory names skipped in addition to the built-in list.
    /// A leading `*` matches by suffix (e.g. `*.egg-info`).
    #[serde(default)]
    pub skip_dirs: Vec<String>,
    /// Skip `test_*` / `test-*` files. Default: true.
    pub skip_test_files: Option<bool>,
    /// Follow symbolic links. Default: false.
    pub follow_symlinks: Option<bool>,
    /// Detector ids that must not run.
    #[serde(default)]
    pub disabled_detectors: Vec<String>,
    /// Attach display links to findings. Default: true.
    pub file_links: Option<bool>,
}

impl ScanConfig {
    /// Returns the effective max file size, defaulting to 5MB.
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Returns the effective thread count, defaulting to 0 (auto-detect).
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    /// Returns the analysed extensions, falling back to the defaults.
    pub fn effective_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            self.extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect()
        }
    }

    pub fn effective_skip_test_files(&self) -> bool {
        self.skip_test_files.unwrap_or(true)
    }

    pub fn effective_file_links(&self) -> bool {
        self.file_links.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = ScanConfig::default();
        assert_eq!(cfg.effective_max_file_size(), DEFAULT_MAX_FILE_SIZE);
        assert_eq!(cfg.effective_threads(), 0);
        assert_eq!(cfg.effective_extensions(), vec!["py", "ts", "tsx", "js", "jsx"]);
        assert!(cfg.effective_skip_test_files());
        assert!(cfg.effective_file_links());
    }

    #[test]
    fn extensions_are_normalized() {
        let cfg = ScanConfig {
            extensions: vec![".PY".into(), "yml".into()],
            ..Default::default()
        };
        assert_eq!(cfg.effective_extensions(), vec!["py", "yml"]);
    }
}
