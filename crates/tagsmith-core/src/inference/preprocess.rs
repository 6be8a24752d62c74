//! Image preprocessing for the tagger model.
//!
//! The model expects:
//! - Input size: 448×448 pixels, aspect preserved by letterboxing on black
//! - Normalization: ImageNet mean/std applied to pixel/255
//! - Channel order: RGB
//! - Tensor layout: NCHW [batch, channels, height, width]

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::{Array4, Axis};

/// Side length of the square model input.
pub const INPUT_SIZE: u32 = 448;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// Per-channel normalization mean.
const NORM_MEAN: [f32; CHANNELS] = [0.485, 0.456, 0.406];

/// Per-channel normalization std.
const NORM_STD: [f32; CHANNELS] = [0.229, 0.224, 0.225];

/// Placement of a resized image inside the square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Letterbox {
    pub width: u32,
    pub height: u32,
    pub x_offset: u32,
    pub y_offset: u32,
}

impl Letterbox {
    /// Fit a `width`×`height` image into a `target`×`target` square.
    ///
    /// The longer side becomes `target`; the other side is truncated to an
    /// integer (never below 1) and the result is centred.
    pub fn fit(width: u32, height: u32, target: u32) -> Self {
        let w = width.max(1) as f64;
        let h = height.max(1) as f64;
        let ratio = (target as f64 / w).min(target as f64 / h);
        let new_w = ((w * ratio) as u32).clamp(1, target);
        let new_h = ((h * ratio) as u32).clamp(1, target);
        Self {
            width: new_w,
            height: new_h,
            x_offset: (target - new_w) / 2,
            y_offset: (target - new_h) / 2,
        }
    }
}

/// Resize and letterbox one image onto a black square canvas.
pub fn letterbox(image: &DynamicImage, target: u32) -> RgbImage {
    let rgb = image.to_rgb8();
    let geometry = Letterbox::fit(rgb.width(), rgb.height(), target);
    let resized = imageops::resize(&rgb, geometry.width, geometry.height, FilterType::Lanczos3);

    let mut canvas = RgbImage::from_pixel(target, target, Rgb([0, 0, 0]));
    imageops::overlay(
        &mut canvas,
        &resized,
        geometry.x_offset as i64,
        geometry.y_offset as i64,
    );
    canvas
}

/// Preprocess a batch of images into one NCHW tensor.
///
/// An empty slice yields a `(0, 3, 448, 448)` tensor.
pub fn prepare_batch(images: &[DynamicImage]) -> Array4<f32> {
    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((images.len(), CHANNELS, size, size));

    for (image, mut slot) in images.iter().zip(tensor.axis_iter_mut(Axis(0))) {
        let canvas = letterbox(image, INPUT_SIZE);
        for (x, y, pixel) in canvas.enumerate_pixels() {
            for c in 0..CHANNELS {
                let value = pixel.0[c] as f32 / 255.0;
                slot[[c, y as usize, x as usize]] = (value - NORM_MEAN[c]) / NORM_STD[c];
            }
        }
    }

    tensor
}
