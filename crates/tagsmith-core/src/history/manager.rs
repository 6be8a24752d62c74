//! Bounded undo/redo history.

use std::collections::VecDeque;

use super::action::UndoAction;

/// Default number of actions kept on the undo stack.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Undo and redo stacks for tag edits.
///
/// Owned by the interactive session; workers hand back outcomes that are
/// turned into actions on the owning side.
#[derive(Debug)]
pub struct UndoManager {
    undo_stack: VecDeque<UndoAction>,
    redo_stack: Vec<UndoAction>,
    max_history: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl UndoManager {
    /// Create a manager keeping at most `max_history` undoable actions.
    pub fn new(max_history: usize) -> Self {
        tracing::debug!("Undo history initialized with max_history={max_history}");
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    /// Record a freshly applied action.
    ///
    /// Clears the redo stack and evicts the oldest action when full.
    pub fn push(&mut self, action: UndoAction) {
        tracing::debug!("Recorded: {action}");
        self.undo_stack.push_back(action);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.max_history {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::debug!("History full, dropped oldest: {evicted}");
            }
        }
    }

    /// Undo the most recent action.
    ///
    /// An action whose inverse fails is dropped from the history.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.undo_stack.pop_back() else {
            return false;
        };
        if action.undo() {
            tracing::debug!("Undid: {action}");
            self.redo_stack.push(action);
            true
        } else {
            tracing::warn!("Undo failed, discarding: {action}");
            false
        }
    }

    /// Redo the most recently undone action.
    ///
    /// An action that cannot be re-applied is dropped from the history.
    pub fn redo(&mut self) -> bool {
        let Some(action) = self.redo_stack.pop() else {
            return false;
        };
        if action.redo() {
            tracing::debug!("Redid: {action}");
            self.undo_stack.push_back(action);
            true
        } else {
            tracing::warn!("Redo failed, discarding: {action}");
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the action [`undo`](Self::undo) would revert.
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(UndoAction::description)
    }

    /// Description of the action [`redo`](Self::redo) would re-apply.
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(UndoAction::description)
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tag_file::TagFileStore;
    use std::path::{Path, PathBuf};

    fn add_action(file: &Path, tags: &[&str]) -> UndoAction {
        TagFileStore::add(file, tags).unwrap();
        UndoAction::AddTags {
            file: file.to_path_buf(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "base").unwrap();

        let mut history = UndoManager::default();
        history.push(add_action(&file, &["x", "y"]));
        let after_add = std::fs::read_to_string(&file).unwrap();

        assert!(history.undo());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "base");
        assert!(history.can_redo());

        assert!(history.redo());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), after_add);
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_push_clears_redo() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "").unwrap();

        let mut history = UndoManager::default();
        history.push(add_action(&file, &["x"]));
        assert!(history.undo());
        history.push(add_action(&file, &["y"]));

        assert!(!history.can_redo());
        assert!(!history.redo());
    }

    #[test]
    fn test_eviction_keeps_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "").unwrap();

        let mut history = UndoManager::new(50);
        for i in 0..51 {
            let tag = format!("t{i}");
            history.push(add_action(&file, &[tag.as_str()]));
        }
        assert_eq!(history.undo_len(), 50);
        assert_eq!(history.undo_description().as_deref(), Some("add 't50'"));

        for _ in 0..50 {
            assert!(history.undo());
        }
        assert!(!history.can_undo());
        // The evicted action's tag is still on disk.
        assert_eq!(TagFileStore::read(&file).unwrap(), vec!["t0"]);

        for _ in 0..50 {
            assert!(history.redo());
        }
        assert_eq!(TagFileStore::read(&file).unwrap().len(), 51);
    }

    #[test]
    fn test_failed_undo_drops_action() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "").unwrap();

        let mut history = UndoManager::default();
        history.push(add_action(&file, &["x"]));
        std::fs::remove_file(&file).unwrap();

        assert!(!history.undo());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_failed_redo_drops_action() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "").unwrap();

        let mut history = UndoManager::default();
        history.push(add_action(&file, &["x"]));
        assert!(history.undo());
        std::fs::remove_file(&file).unwrap();

        assert!(!history.redo());
        assert!(!history.can_redo());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_empty_history() {
        let mut history = UndoManager::default();
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(history.undo_description(), None);
        assert_eq!(history.redo_description(), None);
        assert_eq!(history.max_history(), DEFAULT_MAX_HISTORY);
    }

    #[test]
    fn test_clear() {
        let mut history = UndoManager::new(5);
        history.push(UndoAction::RemoveTag {
            file: PathBuf::from("missing.txt"),
            tag: "x".into(),
            original_index: 0,
        });
        assert_eq!(history.undo_description().as_deref(), Some("remove 'x'"));
        history.clear();
        assert_eq!(history.undo_len(), 0);
    }
}
