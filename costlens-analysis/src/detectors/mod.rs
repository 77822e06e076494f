//! Per-concern detectors and the registry that runs them.

pub mod agentcore;
pub mod bedrock;
pub mod payload;
pub mod prompt_engineering;
pub mod registry;
pub mod traits;

pub use agentcore::AgentCoreDetector;
pub use bedrock::BedrockDetector;
pub use payload::PayloadDetector;
pub use prompt_engineering::PromptEngineeringDetector;
pub use registry::{create_default_registry, DetectorRegistry};
pub use traits::Detector;
