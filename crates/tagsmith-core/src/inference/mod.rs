//! ONNX tag inference.
//!
//! This module turns decoded images into selected tags: letterbox
//! preprocessing, a single forward pass per batch, sigmoid scoring and
//! thresholded selection against the label table.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tagsmith_core::inference::InferenceEngine;
//! use tagsmith_core::types::SelectionConfig;
//!
//! let engine = InferenceEngine::load(&model_path, None)?;
//! let selection = SelectionConfig::general_and_character(0.40, 0.65, 55, 1);
//! let results = engine.tag_batch(&[image], &selection)?;
//! ```

pub mod preprocess;
pub mod session;

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ndarray::Array4;

use crate::error::{PipelineError, PipelineResult};
use crate::tagging::labels::{discover_labels, LabelTable};
use crate::tagging::selector::TagSelector;
use crate::types::{SelectionConfig, TagResult};

use self::session::TaggerSession;

pub use self::preprocess::INPUT_SIZE;

/// Anything that can tag a single decoded image.
///
/// The batch processor depends on this seam rather than on the ONNX engine
/// directly, so runs can be driven by a scripted tagger in tests.
pub trait ImageTagger {
    /// Tag one image under the given selection policy.
    fn tag_image(
        &self,
        image: &DynamicImage,
        selection: &SelectionConfig,
    ) -> PipelineResult<TagResult>;

    /// Label table used to resolve series tags.
    fn labels(&self) -> &LabelTable;
}

/// Model session plus label table, loaded once per run.
pub struct InferenceEngine {
    session: TaggerSession,
    labels: LabelTable,
    labels_path: PathBuf,
}

impl InferenceEngine {
    /// Load the model and its label table.
    ///
    /// The label table is `labels_override` when given, otherwise it is
    /// discovered next to the model file.
    pub fn load(model_path: &Path, labels_override: Option<&Path>) -> PipelineResult<Self> {
        if !model_path.is_file() {
            return Err(PipelineError::NotFound {
                path: model_path.to_path_buf(),
                what: "model file",
            });
        }

        tracing::info!("Loading tagger model from {:?}", model_path);
        let session = TaggerSession::load(model_path)?;

        let model_dir = model_path.parent().unwrap_or_else(|| Path::new("."));
        let labels_path = discover_labels(model_dir, labels_override).ok_or_else(|| {
            PipelineError::NotFound {
                path: labels_override
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| model_dir.to_path_buf()),
                what: "label file",
            }
        })?;
        let labels = LabelTable::load(&labels_path)?;
        tracing::info!(
            "Tagger ready: {} tags from {:?}",
            labels.len(),
            labels_path
        );

        Ok(Self {
            session,
            labels,
            labels_path,
        })
    }

    /// Preprocess images into one NCHW batch tensor.
    pub fn prepare_batch(&self, images: &[DynamicImage]) -> Array4<f32> {
        preprocess::prepare_batch(images)
    }

    /// Run the model on a prepared batch and return per-tag probabilities.
    pub fn infer_batch(&self, batch: &Array4<f32>) -> PipelineResult<Vec<Vec<f32>>> {
        self.session.run_batch(batch)
    }

    /// Tag a batch of images.
    ///
    /// Returns one result per image. An empty label table yields empty
    /// results without consulting the scores.
    pub fn tag_batch(
        &self,
        images: &[DynamicImage],
        selection: &SelectionConfig,
    ) -> PipelineResult<Vec<TagResult>> {
        if images.is_empty() {
            return Ok(vec![]);
        }
        let batch = self.prepare_batch(images);
        let scores = self.infer_batch(&batch)?;
        Ok(select_all(&self.labels, &scores, selection))
    }

    /// Label file the table was loaded from.
    pub fn labels_path(&self) -> &Path {
        &self.labels_path
    }

    /// Model file the session was loaded from.
    pub fn model_path(&self) -> &Path {
        self.session.model_path()
    }
}

impl ImageTagger for InferenceEngine {
    fn tag_image(
        &self,
        image: &DynamicImage,
        selection: &SelectionConfig,
    ) -> PipelineResult<TagResult> {
        let mut results = self.tag_batch(std::slice::from_ref(image), selection)?;
        Ok(results.pop().unwrap_or_default())
    }

    fn labels(&self) -> &LabelTable {
        &self.labels
    }
}

/// Apply selection to every score row.
fn select_all(
    labels: &LabelTable,
    scores: &[Vec<f32>],
    selection: &SelectionConfig,
) -> Vec<TagResult> {
    if labels.is_empty() {
        return scores.iter().map(|_| TagResult::default()).collect();
    }
    let selector = TagSelector::new(selection.clone());
    scores
        .iter()
        .map(|row| TagResult::from_tags(selector.select(labels, row)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TagCategory, TagMeta};

    #[test]
    fn test_load_missing_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = InferenceEngine::load(&dir.path().join("model.onnx"), None)
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::NotFound { what: "model file", .. }));
    }

    #[test]
    fn test_select_all_empty_labels_gives_empty_results() {
        let results = select_all(
            &LabelTable::default(),
            &[vec![0.9, 0.8], vec![0.7]],
            &SelectionConfig::default(),
        );
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(TagResult::is_empty));
    }

    #[test]
    fn test_select_all_one_result_per_row() {
        let labels = LabelTable::from_tags(vec![
            TagMeta {
                name: "smile".to_string(),
                category: TagCategory::General,
                count: None,
                series_ids: vec![],
            },
            TagMeta {
                name: "alice".to_string(),
                category: TagCategory::Character,
                count: None,
                series_ids: vec![],
            },
        ]);
        let selection = SelectionConfig::general_and_character(0.4, 0.65, 55, 1);
        let results = select_all(&labels, &[vec![0.9, 0.5], vec![0.1, 0.7]], &selection);

        assert_eq!(results[0].tags.len(), 1);
        assert_eq!(results[0].tags[0].name, "smile");
        assert_eq!(results[1].tags.len(), 1);
        assert_eq!(results[1].tags[0].name, "alice");
    }
}
