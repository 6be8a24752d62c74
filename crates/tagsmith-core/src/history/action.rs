//! Reversible tag edits.
//!
//! Each action stores just enough to replay or invert itself against the
//! files on disk. Inverses are name based: undoing an add removes tags by
//! name, so a tag re-added by an unrelated later edit is removed as well.
//! Snapshots would avoid that but are not kept.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::store::bulk::{BulkAddOutcome, BulkRemoveOutcome, InsertPosition};
use crate::store::tag_file::TagFileStore;

/// A tag edit that can be undone and redone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// Tags appended to one sidecar
    AddTags { file: PathBuf, tags: Vec<String> },

    /// One tag removed from one sidecar, with the index it held
    RemoveTag {
        file: PathBuf,
        tag: String,
        original_index: usize,
    },

    /// Tags added to several sidecars
    BulkAddTags {
        files: Vec<PathBuf>,
        tags: Vec<String>,
        position: InsertPosition,
    },

    /// One tag removed from several sidecars, with its index in each
    BulkRemoveTags {
        tag: String,
        file_positions: Vec<(PathBuf, usize)>,
    },
}

impl UndoAction {
    /// Inverse of a bulk add; `None` when no file changed.
    pub fn from_bulk_add(outcome: &BulkAddOutcome) -> Option<Self> {
        (!outcome.changed_files.is_empty()).then(|| Self::BulkAddTags {
            files: outcome.changed_files.clone(),
            tags: outcome.tags.clone(),
            position: outcome.position,
        })
    }

    /// Inverse of a bulk remove; `None` when no file changed.
    pub fn from_bulk_remove(outcome: &BulkRemoveOutcome) -> Option<Self> {
        (!outcome.file_positions.is_empty()).then(|| Self::BulkRemoveTags {
            tag: outcome.tag.clone(),
            file_positions: outcome.file_positions.clone(),
        })
    }

    /// Revert the edit. Returns `false` if it could not be applied.
    pub fn undo(&self) -> bool {
        match self {
            Self::AddTags { file, tags } => single(file, "undo add", || {
                remove_each(file, tags)
            }),
            Self::RemoveTag {
                file,
                tag,
                original_index,
            } => single(file, "undo remove", || {
                TagFileStore::insert_at(file, tag, *original_index).map(|_| ())
            }),
            Self::BulkAddTags { files, tags, .. } => {
                bulk(files, PathBuf::as_path, "undo bulk add", |file| {
                    remove_each(file, tags)
                })
            }
            Self::BulkRemoveTags {
                tag,
                file_positions,
            } => bulk(
                file_positions,
                |(file, _)| file.as_path(),
                "undo bulk remove",
                |(file, index)| TagFileStore::insert_at(file, tag, *index).map(|_| ()),
            ),
        }
    }

    /// Re-apply the edit. Returns `false` if it could not be applied.
    pub fn redo(&self) -> bool {
        match self {
            Self::AddTags { file, tags } => single(file, "redo add", || {
                TagFileStore::add(file, tags).map(|_| ())
            }),
            Self::RemoveTag { file, tag, .. } => single(file, "redo remove", || {
                TagFileStore::remove(file, tag).map(|_| ())
            }),
            Self::BulkAddTags {
                files,
                tags,
                position,
            } => bulk(files, PathBuf::as_path, "redo bulk add", |file| {
                match position {
                    InsertPosition::Prepend => TagFileStore::prepend(file, tags),
                    InsertPosition::Append => TagFileStore::add(file, tags),
                }
                .map(|_| ())
            }),
            Self::BulkRemoveTags {
                tag,
                file_positions,
            } => bulk(
                file_positions,
                |(file, _)| file.as_path(),
                "redo bulk remove",
                |(file, _)| TagFileStore::remove(file, tag).map(|_| ()),
            ),
        }
    }

    /// Short human-readable label, e.g. for "Undo: …" prompts.
    pub fn description(&self) -> String {
        match self {
            Self::AddTags { tags, .. } if tags.len() > 3 => {
                format!("add '{}...' ({} tags)", tags[..3].join(", "), tags.len())
            }
            Self::AddTags { tags, .. } => format!("add '{}'", tags.join(", ")),
            Self::RemoveTag { tag, .. } => format!("remove '{tag}'"),
            Self::BulkAddTags { files, tags, .. } => match tags.as_slice() {
                [one] => format!("bulk add '{one}' ({} files)", files.len()),
                _ => format!("bulk add {} tags ({} files)", tags.len(), files.len()),
            },
            Self::BulkRemoveTags {
                tag,
                file_positions,
            } => format!("bulk remove '{tag}' ({} files)", file_positions.len()),
        }
    }
}

impl fmt::Display for UndoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Apply `op` to one file, which must still exist.
fn single(file: &Path, what: &str, op: impl FnOnce() -> io::Result<()>) -> bool {
    if !file.exists() {
        tracing::debug!("Cannot {what}: {:?} no longer exists", file);
        return false;
    }
    match op() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Cannot {what} on {:?}: {e}", file);
            false
        }
    }
}

/// Apply `op` to each item's file; missing files are skipped.
///
/// Succeeds if at least one file was handled.
fn bulk<T>(
    items: &[T],
    path_of: impl Fn(&T) -> &Path,
    what: &str,
    op: impl Fn(&T) -> io::Result<()>,
) -> bool {
    let mut succeeded = 0usize;
    for item in items {
        let file = path_of(item);
        if !file.exists() {
            tracing::debug!("Skipping {what} for missing {:?}", file);
            continue;
        }
        match op(item) {
            Ok(()) => succeeded += 1,
            Err(e) => tracing::warn!("Cannot {what} on {:?}: {e}", file),
        }
    }
    tracing::debug!("{what}: processed {succeeded}/{} files", items.len());
    succeeded > 0
}

/// Remove the first occurrence of each tag. An empty file is left untouched.
fn remove_each(file: &Path, tags: &[String]) -> io::Result<()> {
    let mut current = TagFileStore::read(file)?;
    if current.is_empty() {
        return Ok(());
    }
    for tag in tags {
        if let Some(pos) = current.iter().position(|t| t == tag) {
            current.remove(pos);
        }
    }
    TagFileStore::write(file, &current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::worker::StopFlag;
    use crate::store::bulk::{bulk_add, bulk_remove};

    fn tags(path: &Path) -> Vec<String> {
        TagFileStore::read(path).unwrap()
    }

    #[test]
    fn test_add_tags_undo_redo_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "base").unwrap();

        TagFileStore::add(&file, &["x", "y"]).unwrap();
        let after_add = std::fs::read_to_string(&file).unwrap();
        let action = UndoAction::AddTags {
            file: file.clone(),
            tags: vec!["x".into(), "y".into()],
        };

        assert!(action.undo());
        assert_eq!(tags(&file), vec!["base"]);
        assert!(action.redo());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), after_add);
    }

    #[test]
    fn test_add_tags_undo_on_empty_file_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "").unwrap();
        let action = UndoAction::AddTags {
            file,
            tags: vec!["x".into()],
        };
        assert!(action.undo());
    }

    #[test]
    fn test_single_file_actions_fail_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gone.txt");
        let add = UndoAction::AddTags {
            file: file.clone(),
            tags: vec!["x".into()],
        };
        let remove = UndoAction::RemoveTag {
            file: file.clone(),
            tag: "x".into(),
            original_index: 0,
        };
        assert!(!add.undo());
        assert!(!add.redo());
        assert!(!remove.undo());
        assert!(!remove.redo());
        assert!(!file.exists());
    }

    #[test]
    fn test_remove_tag_undo_restores_clamped_index() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "a, b, c").unwrap();

        let index = TagFileStore::remove_with_index(&file, "c").unwrap().unwrap();
        let action = UndoAction::RemoveTag {
            file: file.clone(),
            tag: "c".into(),
            original_index: index,
        };

        // The file shrank since the removal.
        TagFileStore::remove(&file, "b").unwrap();
        assert!(action.undo());
        assert_eq!(tags(&file), vec!["a", "c"]);

        assert!(action.redo());
        assert_eq!(tags(&file), vec!["a"]);
    }

    #[test]
    fn test_bulk_remove_undo_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            std::fs::write(dir.path().join(name), "keep, drop").unwrap();
        }
        let outcome = bulk_remove(dir.path(), "drop", &StopFlag::new());
        let action = UndoAction::from_bulk_remove(&outcome).unwrap();

        std::fs::remove_file(dir.path().join("b.txt")).unwrap();
        assert!(action.undo());
        assert_eq!(tags(&dir.path().join("a.txt")), vec!["keep", "drop"]);
        assert_eq!(tags(&dir.path().join("c.txt")), vec!["keep", "drop"]);
        assert!(!dir.path().join("b.txt").exists());
    }

    #[test]
    fn test_bulk_action_fails_when_every_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let action = UndoAction::BulkRemoveTags {
            tag: "x".into(),
            file_positions: vec![(dir.path().join("nope.txt"), 0)],
        };
        assert!(!action.undo());
        assert!(!action.redo());
    }

    #[test]
    fn test_bulk_add_undo_redo_prepend() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "m").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();

        let outcome = bulk_add(dir.path(), &["z", "a"], InsertPosition::Prepend, &StopFlag::new());
        let action = UndoAction::from_bulk_add(&outcome).unwrap();
        assert_eq!(tags(&dir.path().join("a.txt")), vec!["a", "z", "m"]);

        assert!(action.undo());
        assert_eq!(tags(&dir.path().join("a.txt")), vec!["m"]);
        assert!(tags(&dir.path().join("b.txt")).is_empty());

        assert!(action.redo());
        assert_eq!(tags(&dir.path().join("a.txt")), vec!["a", "z", "m"]);
        assert_eq!(tags(&dir.path().join("b.txt")), vec!["a", "z"]);
    }

    #[test]
    fn test_constructors_skip_no_op_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        let outcome = bulk_remove(dir.path(), "absent", &StopFlag::new());
        assert!(UndoAction::from_bulk_remove(&outcome).is_none());
    }

    #[test]
    fn test_descriptions() {
        let add = |n: usize| UndoAction::AddTags {
            file: PathBuf::from("a.txt"),
            tags: (0..n).map(|i| format!("t{i}")).collect(),
        };
        assert_eq!(add(1).description(), "add 't0'");
        assert_eq!(add(3).description(), "add 't0, t1, t2'");
        assert_eq!(add(5).description(), "add 't0, t1, t2...' (5 tags)");

        let bulk = UndoAction::BulkRemoveTags {
            tag: "x".into(),
            file_positions: vec![(PathBuf::from("a.txt"), 0), (PathBuf::from("b.txt"), 2)],
        };
        assert_eq!(bulk.to_string(), "bulk remove 'x' (2 files)");
    }
}
