//! Turns per-tag probabilities into a bounded, ranked tag list.
//!
//! Selection runs in four steps:
//! 1. drop anything under [`SCORE_FLOOR`], whatever the configured threshold;
//! 2. drop scores under the category threshold (inclusive boundary);
//! 3. sort by score descending, then name ascending;
//! 4. accept greedily under per-category caps and the global hard cap.

use std::collections::HashMap;

use crate::types::{SelectionConfig, TagCategory, TagPrediction};

use super::labels::LabelTable;

/// Scores below this are discarded before any threshold is consulted.
pub const SCORE_FLOOR: f32 = 1e-4;

/// Applies a [`SelectionConfig`] to raw probability vectors.
#[derive(Debug, Clone, Default)]
pub struct TagSelector {
    config: SelectionConfig,
}

impl TagSelector {
    /// Create a selector for one run's thresholds and caps.
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// The selection policy in use.
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Select tags for one image.
    ///
    /// `scores` is aligned 1:1 with `labels`; extra entries on either side
    /// are ignored.
    pub fn select(&self, labels: &LabelTable, scores: &[f32]) -> Vec<TagPrediction> {
        let mut candidates: Vec<TagPrediction> = labels
            .iter()
            .zip(scores)
            .filter(|&(_, &score)| score >= SCORE_FLOOR)
            .filter(|&(meta, &score)| score >= self.config.threshold_for(meta.category))
            .map(|(meta, &score)| TagPrediction {
                name: meta.name.clone(),
                score,
                category: meta.category,
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.name.cmp(&b.name))
        });

        let hard_cap = self.config.hard_cap();
        let mut per_category: HashMap<TagCategory, usize> = HashMap::new();
        let mut taken = Vec::new();

        for prediction in candidates {
            if taken.len() >= hard_cap {
                break;
            }
            let current = per_category.entry(prediction.category).or_insert(0);
            if let Some(limit) = self.config.limit_for(prediction.category) {
                if *current >= limit {
                    continue;
                }
            }
            *current += 1;
            taken.push(prediction);
        }

        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TagMeta;
    use std::collections::BTreeMap;

    fn table(rows: &[(&str, TagCategory)]) -> LabelTable {
        LabelTable::from_tags(
            rows.iter()
                .map(|(name, category)| TagMeta {
                    name: name.to_string(),
                    category: *category,
                    count: None,
                    series_ids: vec![],
                })
                .collect(),
        )
    }

    fn names(tags: &[TagPrediction]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    fn general_labels(n: usize) -> LabelTable {
        let names: Vec<String> = (0..n).map(|i| format!("g{i}")).collect();
        let rows: Vec<(&str, TagCategory)> = names
            .iter()
            .map(|n| (n.as_str(), TagCategory::General))
            .collect();
        table(&rows)
    }

    #[test]
    fn test_select_is_deterministic_with_name_tiebreak() {
        let labels = table(&[
            ("zeta", TagCategory::General),
            ("alpha", TagCategory::General),
            ("mid", TagCategory::General),
        ]);
        let selector = TagSelector::default();
        let scores = [0.5, 0.5, 0.9];

        let first = selector.select(&labels, &scores);
        assert_eq!(names(&first), vec!["mid", "alpha", "zeta"]);
        for _ in 0..5 {
            assert_eq!(selector.select(&labels, &scores), first);
        }
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let labels = table(&[
            ("exact", TagCategory::General),
            ("under", TagCategory::General),
        ]);
        let config = SelectionConfig {
            thresholds: BTreeMap::from([(TagCategory::General, 0.5)]),
            limits: BTreeMap::new(),
        };
        let result = TagSelector::new(config).select(&labels, &[0.5, 0.4999]);
        assert_eq!(names(&result), vec!["exact"]);
    }

    #[test]
    fn test_score_floor_applies_with_zero_threshold() {
        let labels = table(&[
            ("below", TagCategory::General),
            ("at", TagCategory::General),
        ]);
        let config = SelectionConfig {
            thresholds: BTreeMap::from([(TagCategory::General, 0.0)]),
            limits: BTreeMap::new(),
        };
        let result = TagSelector::new(config).select(&labels, &[SCORE_FLOOR * 0.99, SCORE_FLOOR]);
        assert_eq!(names(&result), vec!["at"]);
    }

    #[test]
    fn test_unconfigured_category_uses_general_threshold() {
        let labels = table(&[
            ("artist_a", TagCategory::Artist),
            ("artist_b", TagCategory::Artist),
        ]);
        let config = SelectionConfig {
            thresholds: BTreeMap::from([(TagCategory::General, 0.6)]),
            limits: BTreeMap::new(),
        };
        let result = TagSelector::new(config).select(&labels, &[0.7, 0.5]);
        assert_eq!(names(&result), vec!["artist_a"]);
    }

    #[test]
    fn test_category_cap_keeps_highest() {
        let labels = general_labels(5);
        let config = SelectionConfig {
            thresholds: BTreeMap::new(),
            limits: BTreeMap::from([(TagCategory::General, 2)]),
        };
        let result = TagSelector::new(config).select(&labels, &[0.3, 0.9, 0.5, 0.8, 0.1]);
        assert_eq!(names(&result), vec!["g1", "g3"]);
    }

    #[test]
    fn test_global_cap_is_sum_of_category_caps() {
        let labels = table(&[
            ("gen_high", TagCategory::General),
            ("gen_mid", TagCategory::General),
            ("char_low", TagCategory::Character),
        ]);
        let config = SelectionConfig {
            thresholds: BTreeMap::new(),
            limits: BTreeMap::from([(TagCategory::General, 1), (TagCategory::Character, 1)]),
        };
        let result = TagSelector::new(config).select(&labels, &[0.95, 0.9, 0.6]);

        assert!(result.len() <= 2);
        let general = result
            .iter()
            .filter(|t| t.category == TagCategory::General)
            .count();
        let character = result
            .iter()
            .filter(|t| t.category == TagCategory::Character)
            .count();
        assert!(general <= 1);
        assert!(character <= 1);
        assert_eq!(names(&result), vec!["gen_high", "char_low"]);
    }

    #[test]
    fn test_uncapped_category_bounded_by_global_cap() {
        let labels = table(&[
            ("m1", TagCategory::Meta),
            ("m2", TagCategory::Meta),
            ("m3", TagCategory::Meta),
            ("g1", TagCategory::General),
        ]);
        let config = SelectionConfig {
            thresholds: BTreeMap::new(),
            limits: BTreeMap::from([(TagCategory::General, 2)]),
        };
        // Meta has no cap, so it can use up the whole global budget of 2.
        let result = TagSelector::new(config).select(&labels, &[0.9, 0.8, 0.7, 0.6]);
        assert_eq!(names(&result), vec!["m1", "m2"]);
    }

    #[test]
    fn test_default_hard_cap_without_limits() {
        let labels = general_labels(150);
        let scores: Vec<f32> = (0..150).map(|i| 0.5 + i as f32 * 0.001).collect();
        let result = TagSelector::default().select(&labels, &scores);
        assert_eq!(result.len(), 100);
    }

    #[test]
    fn test_zero_caps_yield_nothing() {
        let labels = general_labels(3);
        let config = SelectionConfig {
            thresholds: BTreeMap::new(),
            limits: BTreeMap::from([(TagCategory::General, 0)]),
        };
        assert!(TagSelector::new(config)
            .select(&labels, &[0.9, 0.9, 0.9])
            .is_empty());
    }

    #[test]
    fn test_mismatched_lengths_zip_to_shorter() {
        let labels = general_labels(2);
        let result = TagSelector::default().select(&labels, &[0.9, 0.8, 0.7, 0.6]);
        assert_eq!(result.len(), 2);
    }
}
