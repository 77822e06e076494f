//! DetectorRegistry: register, enable/disable, run per file.

use std::path::Path;

use costlens_core::{Finding, FxHashSet};

use super::traits::Detector;

/// Registry of all detectors with enable/disable by id.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
    disabled: FxHashSet<String>,
}

impl DetectorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            disabled: FxHashSet::default(),
        }
    }

    /// Register a detector. Detectors run in registration order.
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    /// Disable a specific detector by ID.
    pub fn disable(&mut self, id: &str) {
        self.disabled.insert(id.to_string());
    }

    /// Enable a previously disabled detector.
    pub fn enable(&mut self, id: &str) {
        self.disabled.remove(id);
    }

    /// Run every enabled detector that accepts `path`.
    ///
    /// A detector that panics contributes no findings; the others still run.
    pub fn run_for(&self, path: &Path, content: &str, file: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        for detector in &self.detectors {
            if !self.should_run(detector.as_ref()) || !detector.can_analyze(path) {
                continue;
            }
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                detector.analyze(content, file)
            }));
            match result {
                Ok(found) => {
                    tracing::debug!(
                        file,
                        detector_id = detector.id(),
                        findings = found.len(),
                        "file analysed"
                    );
                    findings.extend(found);
                }
                Err(_) => {
                    tracing::error!(
                        file,
                        detector_id = detector.id(),
                        "detector panicked during analysis"
                    );
                }
            }
        }
        findings
    }

    /// Ids of all registered detectors, in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.id()).collect()
    }

    /// Total number of registered detectors.
    pub fn count(&self) -> usize {
        self.detectors.len()
    }

    /// Number of enabled detectors.
    pub fn enabled_count(&self) -> usize {
        self.detectors
            .iter()
            .filter(|d| self.should_run(d.as_ref()))
            .count()
    }

    fn should_run(&self, detector: &dyn Detector) -> bool {
        !self.disabled.contains(detector.id())
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the four built-in detectors.
pub fn create_default_registry() -> DetectorRegistry {
    let mut registry = DetectorRegistry::new();
    registry.register(Box::new(super::bedrock::BedrockDetector::new()));
    registry.register(Box::new(super::agentcore::AgentCoreDetector::new()));
    registry.register(Box::new(super::prompt_engineering::PromptEngineeringDetector::new()));
    registry.register(Box::new(super::payload::PayloadDetector::new()));
    registry
}
