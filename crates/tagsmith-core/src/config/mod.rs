//! Configuration management for Tagsmith.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`, so a missing file or a
//! missing section simply means "use the defaults".

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::types::SelectionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Tagsmith.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model location
    pub general: GeneralConfig,

    /// Thresholds, caps and output rendering
    pub tagging: TaggingConfig,

    /// Discovery and decoding
    pub processing: ProcessingConfig,

    /// Undo/redo history
    pub history: HistoryConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.tagsmith.tagsmith/config.toml
    /// - Linux: ~/.config/tagsmith/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\tagsmith\tagsmith\config\config.toml
    ///
    /// Falls back to ~/.tagsmith/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tagsmith", "tagsmith")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".tagsmith").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        expand(&self.general.model_dir)
    }

    /// Full path of the model file.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join(&self.general.model_filename)
    }

    /// Explicit label table path, if configured (with ~ expansion).
    pub fn labels_override(&self) -> Option<PathBuf> {
        self.general.labels_file.as_deref().map(expand)
    }

    /// Selection policy for a tagging run.
    pub fn selection(&self) -> SelectionConfig {
        SelectionConfig::general_and_character(
            self.tagging.general_threshold,
            self.tagging.character_threshold,
            self.tagging.general_limit,
            self.tagging.character_limit,
        )
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
