//! # costlens-analysis
//!
//! Analysis engine for the costlens inference cost analyzer.
//! Contains the model identifier parser, prompt staticness classifier,
//! false-positive filter, detectors, scanner, correlation, and enrichment.

pub mod detectors;
pub mod engine;
pub mod enrichment;
pub mod model_id;
pub mod parsers;
pub mod prompt;
pub mod scanner;

pub use detectors::{create_default_registry, Detector, DetectorRegistry};
pub use model_id::{parse_model_id, ParsedModelId};
pub use prompt::{analyze_prompt_staticness, PromptStaticness};
pub use scanner::{ScanReport, Scanner};
