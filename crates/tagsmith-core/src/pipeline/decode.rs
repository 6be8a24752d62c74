//! Image decoding with content-based format detection and size validation.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;

use crate::config::ProcessingConfig;
use crate::error::{PipelineError, PipelineResult};

/// Image decoder with a configurable dimension limit.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    max_image_dimension: u32,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data, converted to RGB
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a decoder that rejects images larger than `max_image_dimension`.
    pub fn new(max_image_dimension: u32) -> Self {
        Self {
            max_image_dimension,
        }
    }

    /// Create a decoder from processing settings.
    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(config.max_image_dimension)
    }

    /// Decode a file from disk.
    ///
    /// The format is sniffed from the content first, so a PNG saved with a
    /// `.jpg` extension still decodes.
    pub fn decode(&self, path: &Path) -> PipelineResult<DecodedImage> {
        let reader = image::ImageReader::open(path)
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot open image: {e}"),
            })?
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {e}"),
            })?;

        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format".to_string(),
            })?,
        };

        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width > self.max_image_dimension || height > self.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim: self.max_image_dimension,
            });
        }

        let image = DynamicImage::ImageRgb8(image.to_rgb8());
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}
