//! Top-level Scanner: walk, analyse files in parallel, correlate, enrich.

use std::path::Path;
use std::time::Instant;

use costlens_core::config::ScanConfig;
use costlens_core::errors::ScanError;
use costlens_core::Finding;
use rayon::prelude::*;

use super::cancellation::ScanCancellation;
use super::correlation::correlate;
use super::types::{DiscoveredFile, ScanEstimate, ScanReport, ScanWarning};
use super::walker;
use crate::detectors::{create_default_registry, DetectorRegistry};
use crate::enrichment;

/// Runs every registered detector over a project or a single file.
pub struct Scanner {
    config: ScanConfig,
    registry: DetectorRegistry,
    cancellation: ScanCancellation,
}

impl Scanner {
    /// Scanner over the built-in detectors, minus `config.disabled_detectors`.
    pub fn new(config: ScanConfig) -> Self {
        Self::with_registry(config, create_default_registry())
    }

    pub fn with_registry(config: ScanConfig, mut registry: DetectorRegistry) -> Self {
        for id in &config.disabled_detectors {
            registry.disable(id);
        }
        Self {
            config,
            registry,
            cancellation: ScanCancellation::new(),
        }
    }

    /// Handle for cancelling a scan from another thread.
    pub fn cancellation(&self) -> &ScanCancellation {
        &self.cancellation
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    /// Count scannable files under `root` without reading them.
    pub fn estimate(&self, root: &Path) -> Result<ScanEstimate, ScanError> {
        let uncapped = ScanConfig {
            max_files: None,
            ..self.config.clone()
        };
        let outcome = walker::walk_directory(root, &uncapped, self.cancellation.as_atomic())?;
        Ok(ScanEstimate {
            file_count: outcome.files.len(),
            total_size_bytes: outcome.files.iter().map(|f| f.size).sum(),
            skipped_directories: outcome.skipped_directories,
        })
    }

    /// Scan every file under `root`.
    ///
    /// Findings are grouped by file in path order, followed by correlation
    /// findings. A cancelled scan returns `ScanError::Cancelled`.
    pub fn scan(&self, root: &Path) -> Result<ScanReport, ScanError> {
        self.cancellation.reset();
        let start = Instant::now();

        let estimate = self.estimate(root)?;
        let warning = estimate.is_large().then(|| {
            tracing::warn!(
                file_count = estimate.file_count,
                total_size_bytes = estimate.total_size_bytes,
                "large scan"
            );
            ScanWarning::from_estimate(&estimate)
        });

        let outcome = walker::walk_directory(root, &self.config, self.cancellation.as_atomic())?;
        if self.cancellation.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let per_file = self.analyze_files(&outcome.files)?;
        if self.cancellation.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut findings: Vec<Finding> = per_file.into_iter().flatten().collect();
        let cross_cutting = correlate(&findings);
        let cross_cutting_count = cross_cutting.len();
        findings.extend(cross_cutting);

        if self.config.effective_file_links() {
            enrichment::enrich(&mut findings, Some(root));
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            files_scanned = outcome.files.len(),
            total_findings = findings.len(),
            duration_ms,
            "scan complete"
        );

        Ok(ScanReport {
            files_scanned: outcome.files.len(),
            total_findings: findings.len(),
            findings,
            cross_cutting_count,
            skipped_directories: outcome.skipped_directories,
            warning,
            duration_ms,
        })
    }

    /// Analyse one file, then correlate and enrich its findings.
    /// An unreadable file yields no findings.
    pub fn scan_one(&self, path: &Path) -> Vec<Finding> {
        let Some(content) = read_source(path) else {
            return Vec::new();
        };
        let mut findings = self.analyze_content(path, &content);
        findings.extend(correlate(&findings));
        if self.config.effective_file_links() {
            enrichment::enrich(&mut findings, None);
        }
        findings
    }

    /// Run the detectors that accept `path` over in-memory `content`.
    pub fn analyze_content(&self, path: &Path, content: &str) -> Vec<Finding> {
        let file = path.to_string_lossy();
        self.registry.run_for(path, content, &file)
    }

    /// Per-file findings in the order of `files`.
    fn analyze_files(&self, files: &[DiscoveredFile]) -> Result<Vec<Vec<Finding>>, ScanError> {
        let run = || -> Vec<Vec<Finding>> {
            files
                .par_iter()
                .map(|file| {
                    if self.cancellation.is_cancelled() {
                        return Vec::new();
                    }
                    match read_source(&file.path) {
                        Some(content) => self.analyze_content(&file.path, &content),
                        None => Vec::new(),
                    }
                })
                .collect()
        };

        let threads = self.config.effective_threads();
        if threads == 0 {
            return Ok(run());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ScanError::Io {
                path: Default::default(),
                message: format!("thread pool: {e}"),
            })?;
        Ok(pool.install(run))
    }
}

/// File contents as UTF-8 text. Non-fatal: failures are logged and skipped.
fn read_source(path: &Path) -> Option<String> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "file read error");
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(_) => {
            tracing::warn!(path = %path.display(), "file is not valid UTF-8");
            None
        }
    }
}
