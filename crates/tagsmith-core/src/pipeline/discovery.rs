//! File discovery for finding images in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Discovers image files in directories.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    supported_formats: Vec<String>,
}

impl FileDiscovery {
    /// Create a discovery instance for the given extensions (case-insensitive).
    pub fn new<I, S>(supported_formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            supported_formats: supported_formats
                .into_iter()
                .map(|f| f.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Create a discovery instance from processing settings.
    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(&config.supported_formats)
    }

    /// Discover all supported image files at a path.
    ///
    /// If path is a file, returns it if supported.
    /// If path is a directory, recursively finds all supported files,
    /// sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        if path.is_file() {
            return if self.is_supported(path) {
                vec![path.to_path_buf()]
            } else {
                vec![]
            };
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();

        // Sort by path for deterministic ordering
        files.sort();
        files
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_formats.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }
}

/// Move `selected` to the front of `files`, keeping the rest in order.
///
/// Used when a run starts from a focused image. If `selected` is not in the
/// list the order is unchanged.
pub fn prioritize(files: &mut Vec<PathBuf>, selected: &Path) {
    if let Some(pos) = files.iter().position(|f| f == selected) {
        let first = files.remove(pos);
        files.insert(0, first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_is_supported() {
        let discovery = FileDiscovery::from_config(&ProcessingConfig::default());

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.jpeg")));
        assert!(discovery.is_supported(Path::new("test.png")));
        assert!(discovery.is_supported(Path::new("test.webp")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("test.gif")));
        assert!(!discovery.is_supported(Path::new("noext")));
    }

    #[test]
    fn test_discover_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("a.txt"));
        touch(&dir.path().join("sub/c.webp"));

        let discovery = FileDiscovery::from_config(&ProcessingConfig::default());
        let found = discovery.discover(dir.path());
        let names: Vec<PathBuf> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("b.png"),
                PathBuf::from("sub/c.webp"),
            ]
        );
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("one.png");
        let text = dir.path().join("one.txt");
        touch(&image);
        touch(&text);

        let discovery = FileDiscovery::new(["png"]);
        assert_eq!(discovery.discover(&image), vec![image.clone()]);
        assert!(discovery.discover(&text).is_empty());
    }

    #[test]
    fn test_new_normalizes_extensions() {
        let discovery = FileDiscovery::new([".PNG"]);
        assert!(discovery.is_supported(Path::new("x.png")));
    }

    #[test]
    fn test_prioritize_moves_selected_first() {
        let mut files = vec![
            PathBuf::from("a.png"),
            PathBuf::from("b.png"),
            PathBuf::from("c.png"),
        ];
        prioritize(&mut files, Path::new("c.png"));
        assert_eq!(
            files,
            vec![
                PathBuf::from("c.png"),
                PathBuf::from("a.png"),
                PathBuf::from("b.png"),
            ]
        );

        prioritize(&mut files, Path::new("missing.png"));
        assert_eq!(files[0], PathBuf::from("c.png"));
    }
}
