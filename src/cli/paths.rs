//! Default paths and configuration resolution

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Get the configuration directory for allophony
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine configuration directory")?;
    Ok(base.join("allophony"))
}

/// Get the default config file path
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Validate that a config file path has .json extension
pub fn validate_config_path(path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => Ok(()),
        Some(ext) => Err(anyhow::anyhow!(
            "Config file must have .json extension, got .{}. Please use a .json file.",
            ext
        )),
        None => Err(anyhow::anyhow!(
            "Config file must have .json extension. Please add .json to the filename."
        )),
    }
}

/// Build the effective configuration.
///
/// Precedence, lowest first: built-in defaults, the config file (the given
/// path, or the default path if it exists), environment variables, then
/// explicit command-line overrides.
pub fn resolve_config(
    custom_path: Option<&Path>,
    data_dir: Option<PathBuf>,
    model: Option<String>,
) -> Result<Config> {
    let mut config = match custom_path {
        Some(path) => {
            validate_config_path(path)?;
            Config::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        None => match default_config_path() {
            Ok(path) if path.exists() => Config::load(&path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            _ => Config::default(),
        },
    }
    .with_env();

    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(model) = model {
        config.model = model;
    }

    Ok(config)
}
