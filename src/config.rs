//! Runtime configuration.
//!
//! Stored as JSON. Missing fields take their defaults, so a config file only
//! needs the values it overrides:
//!
//! ```json
//! { "model": "allovera" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PhoneticError, Result};
use crate::feature::DEFAULT_MAX_SYMBOL_LEN;
use crate::lang::LocalDirResolver;
use crate::resource::read_resource;

/// Environment variable overriding [`Config::data_dir`].
pub const DATA_DIR_ENV: &str = "ALLOPHONY_DATA_DIR";
/// Environment variable overriding [`Config::model`].
pub const MODEL_ENV: &str = "ALLOPHONY_MODEL";

/// Default model name.
pub const DEFAULT_MODEL: &str = "latest";

/// Default data directory: `<local data dir>/allophony`, or `./allophony`
/// when the platform has no local data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("allophony"))
        .unwrap_or_else(|| PathBuf::from("allophony"))
}

/// Where inventories live and how symbols are tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root holding `model/<model>/<lang_id>/` inventory directories
    pub data_dir: PathBuf,
    /// Model name, or a directory containing per-language subdirectories
    pub model: String,
    /// Longest symbol the tokenizer tries, in codepoints
    pub max_symbol_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            model: DEFAULT_MODEL.to_string(),
            max_symbol_len: DEFAULT_MAX_SYMBOL_LEN,
        }
    }
}

impl Config {
    /// Defaults with [`DATA_DIR_ENV`] and [`MODEL_ENV`] applied.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply [`DATA_DIR_ENV`] and [`MODEL_ENV`] on top of `self`.
    pub fn with_env(mut self) -> Self {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.is_empty() {
                self.model = model;
            }
        }
        self
    }

    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// `ResourceUnavailable` if the file is missing, `Config` if it is not
    /// valid JSON or sets `max_symbol_len` to 0.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = read_resource(path)?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| PhoneticError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PhoneticError::io(parent, e))?;
        }
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| PhoneticError::Config(e.to_string()))?;
        fs::write(path, contents).map_err(|e| PhoneticError::io(path, e))
    }

    fn validate(&self) -> Result<()> {
        if self.max_symbol_len == 0 {
            return Err(PhoneticError::Config(
                "max_symbol_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory resolver rooted at [`data_dir`](Self::data_dir).
    pub fn resolver(&self) -> LocalDirResolver {
        LocalDirResolver::new(&self.data_dir)
    }
}
