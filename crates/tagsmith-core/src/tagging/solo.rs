//! The "solo" rule.
//!
//! A general tag named `solo` means the image shows one character. When the
//! model still predicts several character tags, they are nearly always
//! near-miss confusions, so only the best one is kept and the series tags
//! are taken from that character alone.

use std::collections::BTreeSet;

use crate::types::{TagCategory, TagPrediction, TagResult};

use super::labels::LabelTable;

/// Name of the general tag that triggers the rule (matched case-insensitively).
pub const SOLO_TAG: &str = "solo";

/// Apply the solo rule and derive series tags.
///
/// Returns a new result holding the general tags (unchanged, in order)
/// followed by the kept character tags. Other categories are not carried
/// over. `series_tags` is the union of series ids of the kept characters.
pub fn apply_solo_rule(result: &TagResult, labels: &LabelTable, enabled: bool) -> TagResult {
    let general: Vec<&TagPrediction> = result.in_category(TagCategory::General).collect();
    let characters: Vec<&TagPrediction> = result.in_category(TagCategory::Character).collect();

    let solo_found = general
        .iter()
        .any(|t| t.name.to_lowercase() == SOLO_TAG);

    let kept: Vec<&TagPrediction> = if enabled && solo_found && !characters.is_empty() {
        best_character(&characters).into_iter().collect()
    } else {
        characters
    };

    let series_tags: BTreeSet<String> = kept
        .iter()
        .filter_map(|t| labels.get(&t.name))
        .flat_map(|meta| meta.series_ids.iter().cloned())
        .collect();

    if enabled && solo_found && kept.len() == 1 {
        tracing::trace!("Solo rule kept character {:?}", kept[0].name);
    }

    TagResult {
        tags: general.into_iter().chain(kept).cloned().collect(),
        series_tags,
    }
}

/// Highest-scoring character; the first one wins a tie.
fn best_character<'a>(characters: &[&'a TagPrediction]) -> Option<&'a TagPrediction> {
    characters.iter().copied().fold(None, |best, t| match best {
        Some(b) if b.score >= t.score => Some(b),
        _ => Some(t),
    })
}
