//! Configuration structures for the intake pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ApuraError;

/// Main configuration for apura.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApuraConfig {
    /// Where input documents are listed from.
    pub source: SourceConfig,

    /// Batch execution settings.
    pub batch: BatchConfig,

    /// Document extraction settings.
    pub extraction: ExtractionConfig,

    /// Report output settings.
    pub output: OutputConfig,
}

/// Local source folder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Folder scanned when no input is given.
    pub folder: PathBuf,

    /// Descend into sub-folders.
    pub recursive: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("./input_data"),
            recursive: false,
        }
    }
}

/// Batch execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of worker threads (1 = sequential).
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// Extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Encoding label used for text reports that are not valid UTF-8.
    pub fallback_encoding: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_encoding: "windows-1252".to_string(),
        }
    }
}

/// Report sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report file path.
    pub path: PathBuf,

    /// CSV field delimiter.
    pub delimiter: char,

    /// Do not write a report when no record was extracted.
    pub skip_empty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("relatorio_final.csv"),
            delimiter: ',',
            skip_empty: false,
        }
    }
}

impl ApuraConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ApuraError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| ApuraError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), ApuraError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ApuraError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ApuraError> {
        if self.batch.workers == 0 {
            return Err(ApuraError::Config("batch.workers must be at least 1".into()));
        }
        if encoding_rs::Encoding::for_label(self.extraction.fallback_encoding.as_bytes()).is_none()
        {
            return Err(ApuraError::Config(format!(
                "unknown encoding label: {}",
                self.extraction.fallback_encoding
            )));
        }
        if !self.output.delimiter.is_ascii() {
            return Err(ApuraError::Config(format!(
                "delimiter must be ASCII, got {:?}",
                self.output.delimiter
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApuraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.path, PathBuf::from("relatorio_final.csv"));
        assert_eq!(config.batch.workers, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ApuraConfig = serde_json::from_str(r#"{"batch": {"workers": 4}}"#).unwrap();
        assert_eq!(config.batch.workers, 4);
        assert_eq!(config.extraction.fallback_encoding, "windows-1252");
        assert_eq!(config.output.delimiter, ',');
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ApuraConfig::default();
        config.batch.workers = 0;
        assert!(config.validate().is_err());

        let mut config = ApuraConfig::default();
        config.extraction.fallback_encoding = "klingon".into();
        assert!(config.validate().is_err());

        let mut config = ApuraConfig::default();
        config.output.delimiter = 'ç';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ApuraConfig::default();
        config.output.delimiter = ';';
        config.save(&path).unwrap();

        let loaded = ApuraConfig::from_file(&path).unwrap();
        assert_eq!(loaded.output.delimiter, ';');
    }
}
