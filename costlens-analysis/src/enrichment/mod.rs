//! Post-processing applied to a finished list of findings.

pub mod file_links;

pub use file_links::{enrich, file_link};
