//! Undo/redo history for tag edits.

pub mod action;
pub mod manager;

pub use action::UndoAction;
pub use manager::{UndoManager, DEFAULT_MAX_HISTORY};
