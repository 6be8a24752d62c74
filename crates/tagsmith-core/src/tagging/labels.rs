//! Label taxonomy loading.
//!
//! The label file is a generated CSV (`selected_tags.csv`) whose rows are
//! `[index, unused, name, category, count, series_ids_json]`. Rows that do not
//! fit that shape are dropped rather than failing the load, because the file
//! may gain columns or odd rows between model releases.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{TagCategory, TagMeta};

/// Minimum number of columns a usable row must have.
const MIN_COLUMNS: usize = 6;

/// Conventional label file names, in priority order.
const DEFAULT_LABEL_NAMES: [&str; 3] = [
    "selected_tags.csv",
    "selected_tags_v3.csv",
    "selected_tags_v3c.csv",
];

/// Prefix shared by every label file variant.
const LABEL_PREFIX: &str = "selected_tags";

/// Tag metadata indexed by position (model output order) and by name.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    tags: Vec<TagMeta>,
    by_name: HashMap<String, usize>,
}

impl LabelTable {
    /// Build a table from already-parsed rows.
    ///
    /// When a name appears twice the later row wins the name lookup, while
    /// both rows keep their positions.
    pub fn from_tags(tags: Vec<TagMeta>) -> Self {
        let by_name = tags
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        Self { tags, by_name }
    }

    /// Load and parse a label file.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        if !path.is_file() {
            return Err(PipelineError::NotFound {
                path: path.to_path_buf(),
                what: "label file",
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| PipelineError::LabelFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut tags = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => {
                    return Err(PipelineError::LabelFile {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::trace!("Skipping unreadable label row: {e}");
                    dropped += 1;
                    continue;
                }
            };
            let fields: Vec<&str> = record.iter().collect();
            match parse_row(&fields) {
                Some(meta) => tags.push(meta),
                None => dropped += 1,
            }
        }

        tracing::debug!(
            "Loaded {} tags from {:?} ({} rows dropped)",
            tags.len(),
            path,
            dropped
        );
        Ok(Self::from_tags(tags))
    }

    /// Look up a tag by exact name.
    pub fn get(&self, name: &str) -> Option<&TagMeta> {
        self.by_name.get(name).map(|&i| &self.tags[i])
    }

    /// All tags in model output order.
    pub fn tags(&self) -> &[TagMeta] {
        &self.tags
    }

    /// Iterate tags in model output order.
    pub fn iter(&self) -> std::slice::Iter<'_, TagMeta> {
        self.tags.iter()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True when the table holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Parse one CSV row, returning `None` for rows that should be dropped.
fn parse_row(fields: &[&str]) -> Option<TagMeta> {
    if fields.len() < MIN_COLUMNS {
        return None;
    }
    let category = TagCategory::from_code(fields[3])?;
    let count = fields[4].trim().parse::<i64>().ok();
    Some(TagMeta {
        name: fields[2].to_string(),
        category,
        count,
        series_ids: parse_series_ids(fields[5]),
    })
}

/// Parse a JSON array of series ids; anything malformed is an empty list.
fn parse_series_ids(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Resolve which label file to use.
///
/// An explicit path wins if it exists (and yields `None` if it does not).
/// Otherwise the conventional names are tried in priority order, followed by
/// any other `selected_tags*.csv` in `model_dir`, sorted by name.
pub fn discover_labels(model_dir: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(candidate) = explicit {
        return candidate.exists().then(|| candidate.to_path_buf());
    }

    let mut candidates: Vec<PathBuf> = DEFAULT_LABEL_NAMES
        .iter()
        .map(|name| model_dir.join(name))
        .collect();

    let extras = WalkDir::new(model_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
            name.starts_with(LABEL_PREFIX) && name.ends_with(".csv")
        });
    for extra in extras {
        if !candidates.contains(&extra) {
            candidates.push(extra);
        }
    }

    candidates.into_iter().find(|c| c.is_file())
}
