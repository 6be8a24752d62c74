//! Sidecar tag files: single-file primitives, folder aggregation and bulk edits.

pub mod aggregate;
pub mod bulk;
pub mod tag_file;

pub use aggregate::{collect_tag_counts, TagCount};
pub use bulk::{bulk_add, bulk_remove, BulkAddOutcome, BulkRemoveOutcome, InsertPosition};
pub use tag_file::{parse_tag_input, split_unique, TagFileStore};
