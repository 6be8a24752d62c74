//! State of one interactive edit session.
//!
//! The session owns the undo history. Single-file edits run inline; bulk
//! edits run on a worker and their outcomes are folded in afterwards with
//! [`EditSession::record_bulk_add`] and [`EditSession::record_bulk_remove`].

use std::io;
use std::path::{Path, PathBuf};

use tagsmith_core::store::{split_unique, BulkAddOutcome, BulkRemoveOutcome};
use tagsmith_core::{TagFileStore, UndoAction, UndoManager};

pub struct EditSession {
    folder: PathBuf,
    images: Vec<PathBuf>,
    history: UndoManager,
}

impl EditSession {
    pub fn new(folder: PathBuf, images: Vec<PathBuf>, max_history: usize) -> Self {
        Self {
            folder,
            images,
            history: UndoManager::new(max_history),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    /// Image path relative to the session folder, for menus.
    pub fn display_name(&self, image: &Path) -> String {
        image
            .strip_prefix(&self.folder)
            .unwrap_or(image)
            .display()
            .to_string()
    }

    /// Current tags of an image's sidecar.
    pub fn tags_of(&self, image: &Path) -> io::Result<Vec<String>> {
        TagFileStore::read(&TagFileStore::sidecar_path(image))
    }

    /// Add comma-separated `input` to an image, in input order, and record
    /// the tags that were actually new. Returns those tags.
    pub fn add_tags(&mut self, image: &Path, input: &str) -> io::Result<Vec<String>> {
        let sidecar = TagFileStore::sidecar_path(image);
        let existing = TagFileStore::read(&sidecar)?;
        let added: Vec<String> = split_unique(input)
            .into_iter()
            .filter(|t| !existing.contains(t))
            .collect();
        if added.is_empty() {
            return Ok(added);
        }

        TagFileStore::add(&sidecar, &added)?;
        self.history.push(UndoAction::AddTags {
            file: sidecar,
            tags: added.clone(),
        });
        Ok(added)
    }

    /// Remove one tag from an image. Returns whether it was present.
    pub fn remove_tag(&mut self, image: &Path, tag: &str) -> io::Result<bool> {
        let sidecar = TagFileStore::sidecar_path(image);
        match TagFileStore::remove_with_index(&sidecar, tag)? {
            Some(original_index) => {
                self.history.push(UndoAction::RemoveTag {
                    file: sidecar,
                    tag: tag.to_string(),
                    original_index,
                });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Record a finished bulk add. Returns whether anything was recorded.
    pub fn record_bulk_add(&mut self, outcome: &BulkAddOutcome) -> bool {
        self.record(UndoAction::from_bulk_add(outcome))
    }

    /// Record a finished bulk remove. Returns whether anything was recorded.
    pub fn record_bulk_remove(&mut self, outcome: &BulkRemoveOutcome) -> bool {
        self.record(UndoAction::from_bulk_remove(outcome))
    }

    fn record(&mut self, action: Option<UndoAction>) -> bool {
        match action {
            Some(action) => {
                self.history.push(action);
                true
            }
            None => false,
        }
    }

    /// Undo the latest edit, returning its description on success.
    pub fn undo(&mut self) -> Option<String> {
        let description = self.history.undo_description()?;
        self.history.undo().then_some(description)
    }

    /// Redo the latest undone edit, returning its description on success.
    pub fn redo(&mut self) -> Option<String> {
        let description = self.history.redo_description()?;
        self.history.redo().then_some(description)
    }
}
