//! Folder-wide tag edits.
//!
//! Each sidecar is read, modified and rewritten independently; there is no
//! cross-file transaction. The outcomes record exactly what the history
//! needs to build an inverse action afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pipeline::worker::StopFlag;

use super::aggregate::sidecar_files;
use super::tag_file::{parse_tag_input, TagFileStore};

/// Where bulk-added tags go in each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Prepend,
    #[default]
    Append,
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prepend => f.write_str("prepend"),
            Self::Append => f.write_str("append"),
        }
    }
}

/// Result of [`bulk_add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkAddOutcome {
    /// Normalized tags that were requested
    pub tags: Vec<String>,
    pub position: InsertPosition,
    /// Files whose contents changed
    pub changed_files: Vec<PathBuf>,
    /// Files that could not be read or written
    pub failed: usize,
    /// The run was cut short by a stop request
    pub stopped: bool,
}

/// Result of [`bulk_remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRemoveOutcome {
    pub tag: String,
    /// Changed files with the index the tag first held in each
    pub file_positions: Vec<(PathBuf, usize)>,
    /// Files that could not be read or written
    pub failed: usize,
    /// The run was cut short by a stop request
    pub stopped: bool,
}

/// Add `tags` to every sidecar under `dir`.
///
/// `tags` is normalized with [`parse_tag_input`] semantics (trimmed,
/// deduplicated, sorted). Only tags missing from a file are inserted.
pub fn bulk_add<S: AsRef<str>>(
    dir: &Path,
    tags: &[S],
    position: InsertPosition,
    stop: &StopFlag,
) -> BulkAddOutcome {
    let joined = tags.iter().map(|t| t.as_ref()).collect::<Vec<_>>().join(",");
    let tags = parse_tag_input(&joined);
    let mut outcome = BulkAddOutcome {
        tags,
        position,
        changed_files: Vec::new(),
        failed: 0,
        stopped: false,
    };
    if outcome.tags.is_empty() {
        tracing::warn!("Bulk add called with no usable tags");
        return outcome;
    }

    for file in sidecar_files(dir) {
        if stop.is_stopped() {
            outcome.stopped = true;
            break;
        }
        let result = match position {
            InsertPosition::Prepend => TagFileStore::prepend(&file, &outcome.tags),
            InsertPosition::Append => TagFileStore::add(&file, &outcome.tags),
        };
        match result {
            Ok(true) => outcome.changed_files.push(file),
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Bulk add failed for {:?}: {e}", file);
                outcome.failed += 1;
            }
        }
    }

    tracing::info!(
        "Bulk add of {:?} changed {} files",
        outcome.tags,
        outcome.changed_files.len()
    );
    outcome
}

/// Remove every occurrence of `tag` from every sidecar under `dir`.
pub fn bulk_remove(dir: &Path, tag: &str, stop: &StopFlag) -> BulkRemoveOutcome {
    let tag = tag.trim().to_string();
    let mut outcome = BulkRemoveOutcome {
        tag,
        file_positions: Vec::new(),
        failed: 0,
        stopped: false,
    };
    if outcome.tag.is_empty() {
        return outcome;
    }

    for file in sidecar_files(dir) {
        if stop.is_stopped() {
            outcome.stopped = true;
            break;
        }
        match remove_all(&file, &outcome.tag) {
            Ok(Some(index)) => outcome.file_positions.push((file, index)),
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Bulk remove failed for {:?}: {e}", file);
                outcome.failed += 1;
            }
        }
    }

    tracing::info!(
        "Bulk remove of {:?} changed {} files",
        outcome.tag,
        outcome.file_positions.len()
    );
    outcome
}

/// Drop all occurrences of `tag`, returning the first index it held.
fn remove_all(path: &Path, tag: &str) -> std::io::Result<Option<usize>> {
    let tags = TagFileStore::read(path)?;
    let Some(first) = tags.iter().position(|t| t == tag) else {
        return Ok(None);
    };
    let kept: Vec<&String> = tags.iter().filter(|t| *t != tag).collect();
    TagFileStore::write(path, &kept)?;
    Ok(Some(first))
}
