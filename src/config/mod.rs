//! Viewer configuration
//!
//! Read from a TOML file; every key is optional.

use crate::constants::DEFAULT_DATA_DIR;
use crate::datamodel::LoadOptions;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory holding the session document pairs.
    pub data_dir: PathBuf,
    /// Upstream LUY host the sessions were exported from.
    pub luy_host: Option<String>,
    pub language: String,
    pub log_level: String,
    /// Skip record groups of unknown types instead of failing the load.
    pub skip_unknown_types: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            luy_host: None,
            language: "en".to_string(),
            log_level: "info".to_string(),
            skip_unknown_types: false,
        }
    }
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: ViewerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.level_filter()?;
        if self.language.trim().is_empty() {
            return Err(ConfigError::Validation("language must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn level_filter(&self) -> ConfigResult<LevelFilter> {
        LevelFilter::from_str(&self.log_level).map_err(|_| {
            ConfigError::Validation(format!("unknown log level '{}'", self.log_level))
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            skip_unknown_types: self.skip_unknown_types,
        }
    }
}
