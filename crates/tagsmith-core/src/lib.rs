//! Tagsmith Core - image auto-tagging and sidecar tag editing.
//!
//! Tagsmith runs an ONNX multi-label image tagger over a folder of images and
//! writes one comma-separated `.txt` sidecar per image. It also edits those
//! sidecars afterwards, one file or a whole folder at a time, with undo/redo.
//!
//! # Architecture
//!
//! ```text
//! Image → Decode → Letterbox 448² → ONNX → Sigmoid → Select → Solo rule → Format → .txt
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use tagsmith_core::{BatchOptions, BatchProcessor, Config, InferenceEngine, RunContext};
//!
//! let config = Config::load()?;
//! let engine = InferenceEngine::load(&config.model_path(), config.labels_override().as_deref())?;
//! let processor = BatchProcessor::new(engine, BatchOptions::from_config(&config));
//! let summary = processor.run(&images, &RunContext::new());
//! println!("{} written, {} failed", summary.written, summary.failures.len());
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod history;
pub mod inference;
pub mod math;
pub mod pipeline;
pub mod store;
pub mod tagging;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, TagsmithError};
pub use history::{UndoAction, UndoManager};
pub use inference::{ImageTagger, InferenceEngine};
pub use pipeline::{BatchOptions, BatchProcessor, RunContext, RunEvent, RunSummary, StopFlag};
pub use store::{InsertPosition, TagFileStore};
pub use types::{SelectionConfig, TagCategory, TagMeta, TagPrediction, TagResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
