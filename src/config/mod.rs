pub mod path;

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{SERVICE_DESCRIPTION, SERVICE_NAME, SERVICE_PROVIDER};
use crate::keymap::KeyMapEntry;

/// Represents all possible errors loading a configuration file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Daemon configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Keymap file or name of a keymap in the keymap directories
    pub keymap: Option<PathBuf>,
    /// Whether keyboard reports are held back until the mute key is pressed
    pub start_muted: bool,
    /// Sequence of [modifier, usage] pairs typed by RCtrl+Print
    pub credential: Vec<KeyMapEntry>,
    pub advertisement: AdvertisementConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keymap: None,
            start_muted: true,
            credential: Vec::new(),
            advertisement: AdvertisementConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct AdvertisementConfig {
    pub enabled: bool,
    pub name: String,
    pub description: String,
    pub provider: String,
}

impl Default for AdvertisementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: SERVICE_NAME.to_string(),
            description: SERVICE_DESCRIPTION.to_string(),
            provider: SERVICE_PROVIDER.to_string(),
        }
    }
}

impl Config {
    /// Load a [Config] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<Config, LoadError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [Config] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Config, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Load the configuration from the given path, or from the first config
    /// file found in the search paths. Falls back to defaults when no config
    /// file exists.
    pub fn load(path: Option<&Path>) -> Result<Config, LoadError> {
        if let Some(path) = path {
            log::debug!("Loading config from {path:?}");
            return Self::from_yaml_file(path);
        }

        for path in path::get_config_paths() {
            if !path.is_file() {
                continue;
            }
            log::debug!("Loading config from {path:?}");
            return Self::from_yaml_file(path);
        }

        log::debug!("No config file found. Using defaults.");
        Ok(Config::default())
    }
}
