//! Tracing setup for binaries and tests embedding the analyzer.

pub mod setup;

pub use setup::{init_tracing, init_tracing_with_filter};
