//! Tag taxonomy, selection and sidecar rendering.
//!
//! Turns per-tag probabilities into the final sidecar text: the label table
//! names each model output, the selector applies thresholds and caps, the
//! solo rule prunes character tags, and the formatter orders the result.

pub mod format;
pub mod labels;
pub mod selector;
pub mod solo;

pub use format::format_tags;
pub use labels::{discover_labels, LabelTable};
pub use selector::TagSelector;
pub use solo::apply_solo_rule;
