//! ONNX model session management and inference.
//!
//! Loads a tagger exported to ONNX format and runs one forward pass per
//! batch, returning per-tag sigmoid probabilities.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::{PipelineError, PipelineResult};

/// Output tensors that carry per-tag logits, in priority order.
pub const PREFERRED_OUTPUTS: [&str; 2] = ["prediction", "logits"];

/// Pick the prediction output from a model's output names.
pub fn resolve_output_name<S: AsRef<str>>(outputs: &[S]) -> Option<&'static str> {
    PREFERRED_OUTPUTS
        .iter()
        .copied()
        .find(|preferred| outputs.iter().any(|o| o.as_ref() == *preferred))
}

/// Wraps an ONNX Runtime session for the tagger.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct TaggerSession {
    session: Mutex<Session>,
    model_path: PathBuf,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    /// Name of the output tensor holding logits.
    output_name: &'static str,
}

impl TaggerSession {
    /// Load a tagger model from an ONNX file.
    pub fn load(model_path: &Path) -> PipelineResult<Self> {
        let builder = Session::builder().map_err(|e| PipelineError::DependencyUnavailable {
            path: model_path.to_path_buf(),
            message: format!("Failed to create ONNX session builder: {e}"),
        })?;
        let session = builder
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: "Model declares no inputs".to_string(),
            })?;

        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();
        let output_name =
            resolve_output_name(&output_names).ok_or_else(|| PipelineError::UnknownOutputTensor {
                path: model_path.to_path_buf(),
                outputs: output_names.clone(),
            })?;

        tracing::debug!(
            "Loaded tagger model from {:?} (input: {:?}, output: {:?}, available: {:?})",
            model_path,
            input_name,
            output_name,
            output_names
        );

        Ok(Self {
            session: Mutex::new(session),
            model_path: model_path.to_path_buf(),
            input_name,
            output_name,
        })
    }

    /// Run the model on a prepared NCHW batch.
    ///
    /// Returns one probability vector per batch row.
    pub fn run_batch(&self, batch: &Array4<f32>) -> PipelineResult<Vec<Vec<f32>>> {
        let batch_size = batch.shape()[0];
        if batch_size == 0 {
            return Ok(vec![]);
        }

        // ort takes an owned (shape, data) pair; the batch is in standard layout, so
        // iteration order matches NCHW.
        let shape: Vec<i64> = batch.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = batch.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| self.inference_error(format!(
                "Failed to create input tensor: {e}"
            )))?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| self.inference_error(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| self.inference_error(format!("ONNX inference failed: {e}")))?;

        let prediction = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .ok_or_else(|| {
                self.inference_error(format!("Model did not produce {}", self.output_name))
            })?;

        let (shape, data) = prediction.1.try_extract_tensor::<f32>().map_err(|e| {
            self.inference_error(format!("Failed to extract {} tensor: {e}", self.output_name))
        })?;

        let num_tags = match shape.len() {
            1 => data.len() / batch_size,
            2 => shape[1] as usize,
            _ => {
                return Err(self.inference_error(format!(
                    "Unexpected {} shape: {:?}",
                    self.output_name, shape
                )));
            }
        };
        if num_tags == 0 {
            return Ok(vec![Vec::new(); batch_size]);
        }

        let scores: Vec<Vec<f32>> = data
            .chunks(num_tags)
            .take(batch_size)
            .map(|row| {
                let mut row = row.to_vec();
                crate::math::sigmoid_in_place(&mut row);
                row
            })
            .collect();

        Ok(scores)
    }

    /// The model file this session was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn inference_error(&self, message: String) -> PipelineError {
        PipelineError::Inference {
            path: self.model_path.clone(),
            message,
        }
    }
}
