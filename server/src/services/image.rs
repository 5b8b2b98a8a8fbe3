//! Upload validation and preprocessing for model input.
//!
//! DESIGN
//! ======
//! Each uploaded image is checked cheaply first (size, declared content type),
//! then decoded, converted to RGB, resized to the model's square input, and
//! normalized to `[0, 1]`. Near-uniform frames (lens cap, blown-out webcam)
//! are rejected before they reach the model.
//!
//! Decoding is CPU-bound; callers run [`preprocess`] on the blocking pool.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

pub const TARGET_SIZE: u32 = 224;
pub const MIN_DIMENSION: u32 = 100;
pub const SUPPORTED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

const MIN_MEAN: f32 = 0.01;
const MAX_MEAN: f32 = 0.99;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImageError {
    #[error("{label} is empty")]
    Empty { label: String },
    #[error("{label} too large. Max size: {max} bytes")]
    TooLarge { label: String, max: usize },
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("{label} could not be decoded: {reason}")]
    Decode { label: String, reason: String },
    #[error("{label} too small. Minimum size: {min}x{min}", min = MIN_DIMENSION)]
    TooSmall { label: String },
    #[error("{label} failed quality validation")]
    Quality { label: String },
}

/// One uploaded file as received from multipart.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Field name, used in error messages.
    pub label: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Normalized RGB pixels, row-major, `TARGET_SIZE * TARGET_SIZE * 3` floats.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub pixels: Vec<f32>,
}

impl ProcessedImage {
    #[must_use]
    pub fn mean(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        self.pixels.iter().sum::<f32>() / self.pixels.len() as f32
    }
}

/// Cheap checks that do not require decoding.
pub fn validate(upload: &Upload, max_size: usize) -> Result<(), ImageError> {
    if upload.bytes.is_empty() {
        return Err(ImageError::Empty { label: upload.label.clone() });
    }
    if upload.bytes.len() > max_size {
        return Err(ImageError::TooLarge { label: upload.label.clone(), max: max_size });
    }
    if let Some(content_type) = upload.content_type.as_deref() {
        let normalized = content_type.trim().to_ascii_lowercase();
        if !SUPPORTED_CONTENT_TYPES.contains(&normalized.as_str()) {
            return Err(ImageError::UnsupportedType(content_type.to_owned()));
        }
    }
    Ok(())
}

/// Decode and normalize an upload for model input.
pub fn preprocess(upload: &Upload) -> Result<ProcessedImage, ImageError> {
    let decoded = decode(upload)?;
    if decoded.width() < MIN_DIMENSION || decoded.height() < MIN_DIMENSION {
        return Err(ImageError::TooSmall { label: upload.label.clone() });
    }

    let resized = decoded.resize_exact(TARGET_SIZE, TARGET_SIZE, FilterType::Lanczos3).to_rgb8();
    let pixels: Vec<f32> = resized.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
    let processed = ProcessedImage { pixels };

    let mean = processed.mean();
    if !(MIN_MEAN..=MAX_MEAN).contains(&mean) {
        return Err(ImageError::Quality { label: upload.label.clone() });
    }
    Ok(processed)
}

fn decode(upload: &Upload) -> Result<DynamicImage, ImageError> {
    let decode_err = |reason: String| ImageError::Decode { label: upload.label.clone(), reason };

    let format = image::guess_format(&upload.bytes).map_err(|e| decode_err(e.to_string()))?;
    if !matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Gif | ImageFormat::Bmp
    ) {
        return Err(ImageError::UnsupportedType(format!("{format:?}")));
    }
    image::load_from_memory_with_format(&upload.bytes, format).map_err(|e| decode_err(e.to_string()))
}

#[cfg(test)]
#[path = "image_test.rs"]
pub(crate) mod tests;
