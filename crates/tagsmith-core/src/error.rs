//! Error types for the Tagsmith tagging pipeline.
//!
//! Errors are organized by stage so every message names the file it is about.
//! Setup errors (missing model, missing labels, no runtime) abort a run before
//! any image is touched; per-image errors are isolated by the batch processor.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Tagsmith operations.
#[derive(Error, Debug)]
pub enum TagsmithError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required model or label file does not exist
    #[error("File not found: {path} ({what})")]
    NotFound { path: PathBuf, what: &'static str },

    /// ONNX Runtime could not be initialised for this process
    #[error("Inference runtime unavailable while loading {path}: {message}")]
    DependencyUnavailable { path: PathBuf, message: String },

    /// The model exposes none of the known prediction outputs
    #[error("No prediction output in {path} (outputs: {outputs:?})")]
    UnknownOutputTensor { path: PathBuf, outputs: Vec<String> },

    /// Model session could not be created or queried
    #[error("Model error for {path}: {message}")]
    Model { path: PathBuf, message: String },

    /// Label table could not be read
    #[error("Label file error for {path}: {message}")]
    LabelFile { path: PathBuf, message: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Forward pass or output extraction failed
    #[error("Inference failed for {path}: {message}")]
    Inference { path: PathBuf, message: String },

    /// Writing a sidecar tag file failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A task of this kind is already running
    #[error("A {task} task is already running")]
    Busy { task: &'static str },

    /// A background worker panicked or was cancelled before finishing
    #[error("The {task} worker stopped unexpectedly: {message}")]
    Worker { task: &'static str, message: String },
}

/// Convenience type alias for Tagsmith results.
pub type Result<T> = std::result::Result<T, TagsmithError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_path() {
        let err = PipelineError::NotFound {
            path: PathBuf::from("/models/model.onnx"),
            what: "model file",
        };
        let msg = err.to_string();
        assert!(msg.contains("model.onnx"));
        assert!(msg.contains("model file"));
    }

    #[test]
    fn test_pipeline_error_converts_to_top_level() {
        let err: TagsmithError = PipelineError::Busy { task: "tagging" }.into();
        assert!(err.to_string().contains("tagging task is already running"));
    }
}
