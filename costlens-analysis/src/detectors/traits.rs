//! The contract every detector implements.

use std::path::Path;

use costlens_core::{Finding, Service};

/// A stateless analyzer for one concern.
///
/// Detectors are constructed once and invoked per file for the rest of the
/// process. `analyze` must not keep state between calls and must return an
/// empty list, never panic, on input it cannot handle.
pub trait Detector: Send + Sync {
    /// Unique identifier, used to disable the detector from configuration.
    fn id(&self) -> &str;

    /// Service most of this detector's findings are attributed to.
    fn service(&self) -> Service;

    /// Whether this detector handles `path`, usually by extension.
    fn can_analyze(&self, path: &Path) -> bool;

    /// Produce findings for one file. `file` is the path reported on findings.
    fn analyze(&self, content: &str, file: &str) -> Vec<Finding>;
}
