//! Sidecar text rendering.

use crate::types::{TagCategory, TagPrediction, TagResult};

/// Separator between tags in a sidecar file.
pub const TAG_SEPARATOR: &str = ", ";

/// Render a result as sidecar text.
///
/// Character tags (score descending) come first, then series tags in
/// alphabetical order, then general tags (score descending). Equal scores
/// keep their stored order.
pub fn format_tags(result: &TagResult, convert_underscore: bool) -> String {
    let characters = by_score(result, TagCategory::Character);
    let general = by_score(result, TagCategory::General);

    let ordered = characters
        .into_iter()
        .map(|t| t.name.as_str())
        .chain(result.series_tags.iter().map(String::as_str))
        .chain(general.into_iter().map(|t| t.name.as_str()));

    let rendered: Vec<String> = ordered
        .map(|tag| {
            if convert_underscore {
                tag.replace('_', " ")
            } else {
                tag.to_string()
            }
        })
        .collect();

    rendered.join(TAG_SEPARATOR)
}

fn by_score(result: &TagResult, category: TagCategory) -> Vec<&TagPrediction> {
    let mut tags: Vec<&TagPrediction> = result.in_category(category).collect();
    tags.sort_by(|a, b| b.score.total_cmp(&a.score));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn prediction(name: &str, score: f32, category: TagCategory) -> TagPrediction {
        TagPrediction {
            name: name.to_string(),
            score,
            category,
        }
    }

    fn sample() -> TagResult {
        TagResult {
            tags: vec![
                prediction("long_hair", 0.6, TagCategory::General),
                prediction("1girl", 0.98, TagCategory::General),
                prediction("alice_(wonderland)", 0.8, TagCategory::Character),
            ],
            series_tags: BTreeSet::from(["wonderland".to_string(), "alice_books".to_string()]),
        }
    }

    #[test]
    fn test_order_characters_series_general() {
        assert_eq!(
            format_tags(&sample(), false),
            "alice_(wonderland), alice_books, wonderland, 1girl, long_hair"
        );
    }

    #[test]
    fn test_underscore_conversion_applies_to_every_tag() {
        assert_eq!(
            format_tags(&sample(), true),
            "alice (wonderland), alice books, wonderland, 1girl, long hair"
        );
    }

    #[test]
    fn test_equal_scores_keep_stored_order() {
        let result = TagResult::from_tags(vec![
            prediction("b", 0.5, TagCategory::General),
            prediction("a", 0.5, TagCategory::General),
        ]);
        assert_eq!(format_tags(&result, false), "b, a");
    }

    #[test]
    fn test_other_categories_not_rendered() {
        let result = TagResult::from_tags(vec![
            prediction("general", 0.9, TagCategory::Rating),
            prediction("smile", 0.7, TagCategory::General),
        ]);
        assert_eq!(format_tags(&result, false), "smile");
    }

    #[test]
    fn test_empty_result_is_empty_string() {
        assert_eq!(format_tags(&TagResult::default(), true), "");
    }
}
