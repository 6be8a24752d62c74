//! Tag usage counts across a folder of sidecars.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::pipeline::worker::StopFlag;

use super::tag_file::split_tags;

/// How many sidecars use a tag (each occurrence counts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// All `*.txt` files under `dir`, sorted by path.
pub fn sidecar_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
        })
        .collect();
    files.sort();
    files
}

/// Count tag usage over every sidecar under `dir`.
///
/// Most common first; ties keep first-seen order. Unreadable files are
/// logged and skipped. Returns `None` if `stop` was raised.
pub fn collect_tag_counts(dir: &Path, stop: &StopFlag) -> Option<Vec<TagCount>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for file in sidecar_files(dir) {
        if stop.is_stopped() {
            tracing::debug!("Tag aggregation stopped");
            return None;
        }
        let content = match std::fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping unreadable tag file {:?}: {e}", file);
                continue;
            }
        };
        for tag in split_tags(&content) {
            let count = counts.entry(tag.clone()).or_insert(0);
            if *count == 0 {
                order.push(tag);
            }
            *count += 1;
        }
    }

    if stop.is_stopped() {
        return None;
    }

    let mut result: Vec<TagCount> = order
        .into_iter()
        .map(|tag| {
            let count = counts.get(&tag).copied().unwrap_or(0);
            TagCount { tag, count }
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    result.sort_by(|a, b| b.count.cmp(&a.count));
    Some(result)
}
