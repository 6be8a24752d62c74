//! Sidecar tag file primitives.
//!
//! A sidecar is `<image stem>.txt` next to the image, holding tags joined by
//! `", "`. Nothing here caches: every call re-reads the file, because the
//! CLI, the interactive editor and the history can all touch the same file.

use std::io;
use std::path::{Path, PathBuf};

use crate::tagging::format::TAG_SEPARATOR;

/// Stateless read/modify/write operations on sidecar files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagFileStore;

impl TagFileStore {
    /// Sidecar path for an image: same stem, `.txt` extension.
    pub fn sidecar_path(image: &Path) -> PathBuf {
        image.with_extension("txt")
    }

    /// Read the tags of a sidecar.
    ///
    /// A missing or empty file is an empty list.
    pub fn read(path: &Path) -> io::Result<Vec<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(split_tags(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Overwrite a sidecar with `tags`.
    pub fn write<S: AsRef<str>>(path: &Path, tags: &[S]) -> io::Result<()> {
        let joined = tags
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<_>>()
            .join(TAG_SEPARATOR);
        Self::write_text(path, &joined)
    }

    /// Overwrite a sidecar with already-rendered text.
    pub fn write_text(path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(extended_length_path(path), contents)
    }

    /// Append tags that are not already present.
    ///
    /// Matching is exact and case-sensitive. Duplicates inside `new_tags`
    /// are added once. Returns whether the file changed.
    pub fn add<S: AsRef<str>>(path: &Path, new_tags: &[S]) -> io::Result<bool> {
        let mut tags = Self::read(path)?;
        let before = tags.len();
        for tag in new_tags {
            let tag = tag.as_ref();
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        if tags.len() == before {
            return Ok(false);
        }
        Self::write(path, &tags)?;
        Ok(true)
    }

    /// Put tags that are not already present at the front, in input order.
    ///
    /// Returns whether the file changed.
    pub fn prepend<S: AsRef<str>>(path: &Path, new_tags: &[S]) -> io::Result<bool> {
        let existing = Self::read(path)?;
        let mut front: Vec<String> = Vec::new();
        for tag in new_tags {
            let tag = tag.as_ref();
            if !existing.iter().any(|t| t == tag) && !front.iter().any(|t| t == tag) {
                front.push(tag.to_string());
            }
        }
        if front.is_empty() {
            return Ok(false);
        }
        front.extend(existing);
        Self::write(path, &front)?;
        Ok(true)
    }

    /// Remove the first exact match of `tag`. Returns whether the file changed.
    pub fn remove(path: &Path, tag: &str) -> io::Result<bool> {
        Ok(Self::remove_with_index(path, tag)?.is_some())
    }

    /// Remove the first exact match of `tag`, returning the index it held.
    pub fn remove_with_index(path: &Path, tag: &str) -> io::Result<Option<usize>> {
        let mut tags = Self::read(path)?;
        let Some(index) = tags.iter().position(|t| t == tag) else {
            return Ok(None);
        };
        tags.remove(index);
        Self::write(path, &tags)?;
        Ok(Some(index))
    }

    /// Insert `tag` at `index`, clamped to the current length.
    ///
    /// The tag is inserted even if an equal tag is already present.
    /// Returns the index actually used.
    pub fn insert_at(path: &Path, tag: &str, index: usize) -> io::Result<usize> {
        let mut tags = Self::read(path)?;
        let index = index.min(tags.len());
        tags.insert(index, tag.to_string());
        Self::write(path, &tags)?;
        Ok(index)
    }
}

/// Split sidecar text into trimmed, non-empty tags, keeping order.
pub fn split_tags(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split user-entered tags for a single-file edit: trimmed, non-empty,
/// first occurrence kept, input order preserved.
pub fn split_unique(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in split_tags(input) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Normalize user-entered tags for bulk edits: trimmed, non-empty,
/// deduplicated and sorted.
pub fn parse_tag_input(input: &str) -> Vec<String> {
    let mut tags = split_tags(input);
    tags.sort();
    tags.dedup();
    tags
}

/// Path to open for writing.
///
/// On Windows the parent is canonicalized, which yields a `\\?\` prefixed
/// path that is not subject to `MAX_PATH`. Elsewhere the path is unchanged.
#[cfg(windows)]
pub fn extended_length_path(path: &Path) -> PathBuf {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    match std::fs::canonicalize(parent) {
        Ok(resolved) => resolved.join(name),
        Err(e) => {
            tracing::debug!("Could not resolve {:?} for long-path write: {e}", parent);
            path.to_path_buf()
        }
    }
}

/// Path to open for writing. Only Windows needs a rewrite.
#[cfg(not(windows))]
pub fn extended_length_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sidecar(dir: &tempfile::TempDir, content: Option<&str>) -> PathBuf {
        let path = dir.path().join("image.txt");
        if let Some(content) = content {
            std::fs::write(&path, content).unwrap();
        }
        path
    }

    #[test]
    fn test_sidecar_path_replaces_extension() {
        assert_eq!(
            TagFileStore::sidecar_path(Path::new("/data/cat.photo.png")),
            PathBuf::from("/data/cat.photo.txt")
        );
        assert_eq!(
            TagFileStore::sidecar_path(Path::new("noext")),
            PathBuf::from("noext.txt")
        );
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = sidecar(&dir, None);
        TagFileStore::write(&path, &["a", "b", "c"]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a, b, c");
        assert_eq!(TagFileStore::read(&path).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_read_missing_or_blank_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TagFileStore::read(&dir.path().join("absent.txt"))
            .unwrap()
            .is_empty());
        let blank = sidecar(&dir, Some("  \n"));
        assert!(TagFileStore::read(&blank).unwrap().is_empty());
    }

    #[test]
    fn test_read_trims_and_drops_empty_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = sidecar(&dir, Some(" a ,, b,\n c ,"));
        assert_eq!(TagFileStore::read(&path).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = sidecar(&dir, Some("a"));
        assert!(TagFileStore::add(&path, &["a", "a", "b"]).unwrap());
        assert_eq!(TagFileStore::read(&path).unwrap(), vec!["a", "b"]);

        assert!(!TagFileStore::add(&path, &["b", "a"]).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a, b");
    }

    #[test]
    fn test_add_is_case_sensitive_and_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = sidecar(&dir, None);
        assert!(TagFileStore::add(&path, &["Solo"]).unwrap());
        assert!(TagFileStore::add(&path, &["solo"]).unwrap());
        assert_eq!(TagFileStore::read(&path).unwrap(), vec!["Solo", "solo"]);
    }

    #[test]
    fn test_prepend_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = sidecar(&dir, Some("b, c"));
        assert!(TagFileStore::prepend(&path, &["x", "b", "y", "x"]).unwrap());
        assert_eq!(TagFileStore::read(&path).unwrap(), vec!["x", "y", "b", "c"]);
        assert!(!TagFileStore::prepend(&path, &["c"]).unwrap());
    }

    #[test]
    fn test_remove_first_match_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = sidecar(&dir, Some("a, b, a"));
        assert_eq!(TagFileStore::remove_with_index(&path, "a").unwrap(), Some(0));
        assert_eq!(TagFileStore::read(&path).unwrap(), vec!["b", "a"]);
        assert!(!TagFileStore::remove(&path, "zzz").unwrap());
        assert!(TagFileStore::remove(&path, "a").unwrap());
        assert_eq!(TagFileStore::read(&path).unwrap(), vec!["b"]);
    }

    #[test]
    fn test_insert_at_clamps_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = sidecar(&dir, Some("a, b"));
        assert_eq!(TagFileStore::insert_at(&path, "z", 10).unwrap(), 2);
        assert_eq!(TagFileStore::insert_at(&path, "m", 1).unwrap(), 1);
        assert_eq!(
            TagFileStore::read(&path).unwrap(),
            vec!["a", "m", "b", "z"]
        );
    }

    #[test]
    fn test_split_unique_keeps_input_order() {
        assert_eq!(split_unique("zebra, apple, zebra,, "), vec!["zebra", "apple"]);
        assert!(split_unique(" , ").is_empty());
    }

    #[test]
    fn test_add_appends_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "cat").unwrap();

        assert!(TagFileStore::add(&path, &split_unique("zebra, apple")).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "cat, zebra, apple");
    }

    #[test]
    fn test_parse_tag_input_normalizes() {
        assert_eq!(parse_tag_input(" b, a,,a , c "), vec!["a", "b", "c"]);
        assert!(parse_tag_input(" , ").is_empty());
    }

    #[test]
    fn test_extended_length_path_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.txt");
        assert_eq!(
            extended_length_path(&path).file_name(),
            path.file_name()
        );
    }
}
