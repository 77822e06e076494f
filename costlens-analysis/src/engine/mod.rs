//! Text and syntax-tree primitives shared by every detector.

pub mod false_positive;
pub mod lines;
pub mod matcher;
pub mod spans;
pub mod string_extraction;
pub mod visitor;

pub use false_positive::is_suppressed;
pub use lines::{line_at, LineIndex};
pub use matcher::Matcher;
pub use string_extraction::{extract_strings, ExtractedString, SourceFlavor};
