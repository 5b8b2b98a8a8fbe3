//! Age models behind a trait seam.
//!
//! ARCHITECTURE
//! ============
//! Handlers hold an `Arc<dyn AgeModel>` so a real inference backend can be
//! swapped in without touching routing. The shipped models are placeholders:
//! `MockAgeModel` draws a plausible adult age, `ConstantAgeModel` always
//! answers the same value.

use std::sync::Arc;

use rand::Rng;

use crate::config::{ModelKind, ServerConfig};
use crate::services::image::ProcessedImage;

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;
pub const DEFAULT_CONFIDENCE: f64 = 0.80;

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("model not loaded")]
    NotLoaded,
    #[error("no images supplied")]
    NoImages,
}

/// Model output after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeEstimate {
    pub age: u32,
    /// Between 0 and 1.
    pub confidence: f64,
}

impl AgeEstimate {
    /// Clamp raw model output into the reportable range.
    #[must_use]
    pub fn clamped(age: i64, confidence: f64) -> Self {
        let age = age.clamp(i64::from(MIN_AGE), i64::from(MAX_AGE)) as u32;
        let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
        Self { age, confidence }
    }
}

pub trait AgeModel: Send + Sync {
    /// Short name reported by the model status route.
    fn name(&self) -> &'static str;

    fn is_loaded(&self) -> bool {
        true
    }

    /// Estimate an age from preprocessed views. The first image is the
    /// primary (front) view.
    fn predict(&self, images: &[ProcessedImage]) -> Result<AgeEstimate, PredictionError>;
}

/// Random adult age, for demos without a trained model.
#[derive(Debug, Default)]
pub struct MockAgeModel;

impl AgeModel for MockAgeModel {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn predict(&self, images: &[ProcessedImage]) -> Result<AgeEstimate, PredictionError> {
        if images.is_empty() {
            return Err(PredictionError::NoImages);
        }
        let mut rng = rand::rng();
        let age = rng.random_range(18..=65);
        let confidence = rng.random_range(0.70..0.95);
        Ok(AgeEstimate::clamped(age, confidence))
    }
}

/// Always predicts the same age.
#[derive(Debug)]
pub struct ConstantAgeModel {
    age: u32,
}

impl ConstantAgeModel {
    #[must_use]
    pub fn new(age: u32) -> Self {
        Self { age }
    }
}

impl AgeModel for ConstantAgeModel {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn predict(&self, images: &[ProcessedImage]) -> Result<AgeEstimate, PredictionError> {
        if images.is_empty() {
            return Err(PredictionError::NoImages);
        }
        Ok(AgeEstimate::clamped(i64::from(self.age), DEFAULT_CONFIDENCE))
    }
}

/// Build the model selected by `config`.
#[must_use]
pub fn build_model(config: &ServerConfig) -> Arc<dyn AgeModel> {
    match config.model {
        ModelKind::Mock => Arc::new(MockAgeModel),
        ModelKind::Constant => Arc::new(ConstantAgeModel::new(config.constant_age)),
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
