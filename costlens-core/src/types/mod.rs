//! Shared types for the analysis engine.

pub mod collections;
pub mod finding;
