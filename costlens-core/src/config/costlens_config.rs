//! Top-level configuration document (`costlens.toml`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::scan_config::ScanConfig;
use crate::errors::ConfigError;

/// Root of `costlens.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CostlensConfig {
    pub scan: ScanConfig,
}

impl CostlensConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::ParseError {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&source).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.max_file_size == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_file_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.scan.max_files == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_files".to_string(),
                message: "must be greater than zero; omit it for no limit".to_string(),
            });
        }
        Ok(())
    }
}
