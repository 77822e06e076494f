//! Prompt text analysis: staticness, complexity, and caching risk.

pub mod complexity;
pub mod risk;
pub mod staticness;

pub use complexity::{complexity_score, has_complexity_cues, has_reasoning_markers};
pub use risk::cross_region_caching_severity;
pub use staticness::{analyze_prompt_staticness, analyze_prompt_staticness_with, Confidence, PromptStaticness};
