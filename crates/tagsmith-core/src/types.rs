//! Core data types for the Tagsmith tagging pipeline.
//!
//! These types describe the label taxonomy, per-image predictions and the
//! per-run selection policy (thresholds and caps per category).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Taxonomy category of a tag, ordinal-compatible with the label file codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    General = 0,
    Artist = 1,
    Rating = 2,
    Copyright = 3,
    Character = 4,
    Meta = 5,
}

impl TagCategory {
    /// All categories in ordinal order.
    pub const ALL: [TagCategory; 6] = [
        Self::General,
        Self::Artist,
        Self::Rating,
        Self::Copyright,
        Self::Character,
        Self::Meta,
    ];

    /// Parse a label-file category code.
    ///
    /// Accepts the numeric codes `"0"`..`"5"` and the category names,
    /// case-insensitively. Anything else is `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "0" | "general" => Some(Self::General),
            "1" | "artist" => Some(Self::Artist),
            "2" | "rating" => Some(Self::Rating),
            "3" | "copyright" => Some(Self::Copyright),
            "4" | "character" => Some(Self::Character),
            "5" | "meta" => Some(Self::Meta),
            _ => None,
        }
    }

    /// Category for a numeric ordinal.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Lowercase name used in logs and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Artist => "artist",
            Self::Rating => "rating",
            Self::Copyright => "copyright",
            Self::Character => "character",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the label taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMeta {
    /// Tag name as it appears in the label file (underscores intact)
    pub name: String,

    /// Taxonomy category
    pub category: TagCategory,

    /// Popularity count, informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,

    /// Series / franchise identifiers associated with a character tag
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series_ids: Vec<String>,
}

/// A single accepted tag for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPrediction {
    /// The tag label (e.g., "1girl", "long_hair")
    pub name: String,

    /// Independent sigmoid probability from 0.0 to 1.0
    pub score: f32,

    /// Taxonomy category of the tag
    pub category: TagCategory,
}

/// Tags accepted for one image plus the series tags derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagResult {
    /// Accepted predictions, in selection order
    pub tags: Vec<TagPrediction>,

    /// Series tags harvested from character tags (sorted, deduplicated)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub series_tags: BTreeSet<String>,
}

impl TagResult {
    /// Build a result with no series tags.
    pub fn from_tags(tags: Vec<TagPrediction>) -> Self {
        Self {
            tags,
            series_tags: BTreeSet::new(),
        }
    }

    /// True when no tag was accepted.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Predictions of a single category, in stored order.
    pub fn in_category(&self, category: TagCategory) -> impl Iterator<Item = &TagPrediction> {
        self.tags.iter().filter(move |t| t.category == category)
    }
}

/// Global cap used when no per-category limit is configured at all.
pub const DEFAULT_HARD_CAP: usize = 100;

/// Per-run thresholds and caps for tag selection.
///
/// Only configured categories appear in the maps. A category without a
/// threshold falls back to the General threshold (or 0.0); a category
/// without a cap is only bounded by [`SelectionConfig::hard_cap`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Minimum score per category (inclusive)
    pub thresholds: BTreeMap<TagCategory, f32>,

    /// Maximum accepted tags per category
    pub limits: BTreeMap<TagCategory, usize>,
}

impl SelectionConfig {
    /// Selection with General and Character configured, as the tagger UI exposes.
    pub fn general_and_character(
        general_threshold: f32,
        character_threshold: f32,
        general_limit: usize,
        character_limit: usize,
    ) -> Self {
        Self {
            thresholds: BTreeMap::from([
                (TagCategory::General, general_threshold),
                (TagCategory::Character, character_threshold),
            ]),
            limits: BTreeMap::from([
                (TagCategory::General, general_limit),
                (TagCategory::Character, character_limit),
            ]),
        }
    }

    /// Threshold for a category, falling back to General, then 0.0.
    pub fn threshold_for(&self, category: TagCategory) -> f32 {
        self.thresholds
            .get(&category)
            .or_else(|| self.thresholds.get(&TagCategory::General))
            .copied()
            .unwrap_or(0.0)
    }

    /// Configured cap for a category, if any.
    pub fn limit_for(&self, category: TagCategory) -> Option<usize> {
        self.limits.get(&category).copied()
    }

    /// Ceiling on the total number of accepted tags.
    ///
    /// Sum of the configured caps, or [`DEFAULT_HARD_CAP`] when none are
    /// configured. Categories without their own cap get no separate bound
    /// once any cap is configured; that asymmetry is kept on purpose.
    pub fn hard_cap(&self) -> usize {
        if self.limits.is_empty() {
            DEFAULT_HARD_CAP
        } else {
            self.limits.values().sum()
        }
    }
}
