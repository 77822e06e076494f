//! tree-sitter front end for Python.

use tree_sitter::{Parser, Tree};

/// Parse Python source into a syntax tree.
///
/// Returns `None` when the grammar cannot be loaded or the source contains
/// syntax errors. Callers treat `None` as "nothing to report" for the
/// syntax-tree detectors; regex-based detectors are unaffected.
pub fn parse_python(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
        tracing::error!(error = %e, "failed to load python grammar");
        return None;
    }
    let tree = parser.parse(source, None)?;
    if tree.root_node().has_error() {
        tracing::debug!("python source has syntax errors, skipping tree analysis");
        return None;
    }
    Some(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_source() {
        let tree = parse_python("def f():\n    return 1\n").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
    }

    #[test]
    fn rejects_invalid_source() {
        assert!(parse_python("def f(:\n  return (\n").is_none());
    }

    #[test]
    fn empty_source_is_a_valid_module() {
        assert!(parse_python("").is_some());
    }
}
