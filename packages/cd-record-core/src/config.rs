//! Codec configuration.
//!
//! Supports TOML config files, environment variable overrides, and defaults.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CdError;
use crate::registry::Area;

/// Codec configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Upper bound for any record's total length in bytes (default: 65535)
    pub max_record_length: u32,
    /// Validate the total-length invariant of every recognized record in a stream
    pub strict_length_check: bool,
    /// Records in a stream are followed by a zero byte when their length is odd
    pub word_aligned_records: bool,
    /// Area assumed when the caller does not name one
    pub default_area: Area,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_record_length: u16::MAX as u32,
            strict_length_check: true,
            word_aligned_records: true,
            default_area: Area::RichText,
        }
    }
}

impl CodecConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CdError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CdError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, CdError> {
        toml::from_str(toml_str).map_err(|e| CdError::Config(format!("Invalid TOML: {}", e)))
    }

    /// Saves the configuration to a TOML file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), CdError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| CdError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), toml)
            .map_err(|e| CdError::Config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Applies environment variable overrides.
    ///
    /// Variables are prefixed with `CDREC_`, e.g. `CDREC_MAX_RECORD_LENGTH=4096`.
    pub fn apply_env_overrides(&mut self) -> Result<(), CdError> {
        if let Ok(val) = env::var("CDREC_MAX_RECORD_LENGTH") {
            self.max_record_length = val
                .parse()
                .map_err(|_| CdError::Config(format!("Invalid max_record_length: {}", val)))?;
        }
        if let Ok(val) = env::var("CDREC_STRICT_LENGTH_CHECK") {
            self.strict_length_check = val
                .parse()
                .map_err(|_| CdError::Config(format!("Invalid strict_length_check: {}", val)))?;
        }
        if let Ok(val) = env::var("CDREC_WORD_ALIGNED_RECORDS") {
            self.word_aligned_records = val
                .parse()
                .map_err(|_| CdError::Config(format!("Invalid word_aligned_records: {}", val)))?;
        }
        if let Ok(val) = env::var("CDREC_DEFAULT_AREA") {
            self.default_area = val
                .parse()
                .map_err(|_| CdError::Config(format!("Invalid default_area: {}", val)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.max_record_length, 65535);
        assert!(config.strict_length_check);
        assert!(config.word_aligned_records);
        assert_eq!(config.default_area, Area::RichText);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            max_record_length = 4096
            strict_length_check = false
            default_area = "frameset"
        "#;
        let config = CodecConfig::from_toml(toml).unwrap();
        assert_eq!(config.max_record_length, 4096);
        assert!(!config.strict_length_check);
        // unspecified keys keep their defaults
        assert!(config.word_aligned_records);
        assert_eq!(config.default_area, Area::Frameset);
    }

    #[test]
    fn test_invalid_toml() {
        let err = CodecConfig::from_toml("max_record_length = \"big\"").unwrap_err();
        assert!(matches!(err, CdError::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("codec.toml");
        let config = CodecConfig {
            max_record_length: 1024,
            default_area: Area::ViewMap,
            ..Default::default()
        };
        config.save_to_file(&file_path).unwrap();
        let loaded = CodecConfig::from_file(&file_path).unwrap();
        assert_eq!(loaded, config);
    }
}
