//! Model identifier decomposition.

pub mod parser;

pub use parser::{parse_model_id, CrossRegionScope, ParsedModelId, REGION_PREFIXES};
