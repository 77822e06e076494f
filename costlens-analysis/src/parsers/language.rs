//! Language detection from file extensions.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::SourceFlavor;

/// Languages the detectors know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    TypeScript,
    JavaScript,
    Shell,
    Yaml,
}

impl Language {
    /// Detect language from a file extension (without the dot).
    pub fn from_extension(ext: Option<&str>) -> Option<Self> {
        let ext = ext?.to_ascii_lowercase();
        match ext.as_str() {
            "py" | "pyi" => Some(Self::Python),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "sh" | "bash" => Some(Self::Shell),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(path.extension().and_then(|e| e.to_str()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Shell => "shell",
            Self::Yaml => "yaml",
        }
    }

    /// Comment and string syntax for the text scanners.
    pub fn flavor(&self) -> SourceFlavor {
        match self {
            Self::Python => SourceFlavor::Python,
            Self::TypeScript | Self::JavaScript => SourceFlavor::CLike,
            Self::Shell | Self::Yaml => SourceFlavor::Hash,
        }
    }

    pub fn is_ecmascript(&self) -> bool {
        matches!(self, Self::TypeScript | Self::JavaScript)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercased extension of `path`, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether `path` has one of `allowed` as its extension.
pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    extension_of(path).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_from_extension() {
        assert_eq!(Language::from_extension(Some("py")), Some(Language::Python));
        assert_eq!(Language::from_extension(Some("TSX")), Some(Language::TypeScript));
        assert_eq!(Language::from_extension(Some("yaml")), Some(Language::Yaml));
        assert_eq!(Language::from_extension(Some("rs")), None);
        assert_eq!(Language::from_extension(None), None);
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(has_extension(Path::new("a/B.PY"), &["py"]));
        assert!(!has_extension(Path::new("Makefile"), &["py"]));
    }
}
