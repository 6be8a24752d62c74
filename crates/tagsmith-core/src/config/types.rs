//! Sub-configuration structs with defaults matching the desktop tagger.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the ONNX model and its label table
    pub model_dir: PathBuf,

    /// Model file name inside `model_dir`
    pub model_filename: String,

    /// Explicit label table; discovered next to the model when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.tagsmith/models/pixai-tagger-v0.9-onnx"),
            model_filename: "model.onnx".to_string(),
            labels_file: None,
        }
    }
}

/// Tag selection and sidecar rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Minimum score for general tags
    pub general_threshold: f32,

    /// Minimum score for character tags
    pub character_threshold: f32,

    /// Maximum general tags per image
    pub general_limit: usize,

    /// Maximum character tags per image
    pub character_limit: usize,

    /// Keep a single character when the image is tagged `solo`
    pub enable_solo_character_limit: bool,

    /// Write `long hair` instead of `long_hair`
    pub convert_underscore_to_space: bool,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            general_threshold: 0.40,
            character_threshold: 0.65,
            general_limit: 55,
            character_limit: 1,
            enable_solo_character_limit: true,
            convert_underscore_to_space: true,
        }
    }
}

/// Image discovery and decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Supported input formats
    pub supported_formats: Vec<String>,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "webp".to_string(),
            ],
            max_image_dimension: 20000,
        }
    }
}

/// Undo/redo history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Actions kept on the undo stack
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_history: 50 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
