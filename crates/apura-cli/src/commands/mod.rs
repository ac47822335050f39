//! Subcommands.

pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use apura_core::ApuraConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("apura")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ApuraConfig> {
    if let Some(path) = config_path {
        return Ok(ApuraConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        tracing::debug!("Using config from {}", default_path.display());
        Ok(ApuraConfig::from_file(&default_path)?)
    } else {
        Ok(ApuraConfig::default())
    }
}
