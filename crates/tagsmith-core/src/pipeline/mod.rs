//! Image tagging pipeline components.
//!
//! This module contains the stages of a tagging run:
//! - **discovery**: Find image files in directories
//! - **decode**: Load and decode images with a size guard
//! - **batch**: Tag images one by one and write their sidecars
//! - **worker**: Cancellation flags and single-task slots for background work

pub mod batch;
pub mod decode;
pub mod discovery;
pub mod worker;

// Re-exports for convenient access
pub use batch::{
    BatchOptions, BatchProcessor, FailureKind, ImageFailure, ImageOutcome, RunContext, RunEvent,
    RunSummary, Severity,
};
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{prioritize, FileDiscovery};
pub use worker::{StopFlag, TaskGuard, TaskSlot};
