//! Language identification and the Python syntax-tree front end.

pub mod language;
pub mod python;

pub use language::Language;
pub use python::parse_python;
