//! Capture/predict flow: image in, age out, history updated.
//!
//! DESIGN
//! ======
//! A captured image is held in memory (the "preview") until a predictor
//! answers. Two predictors exist and a run uses exactly one: the HTTP
//! predictor posts the image to the endpoint and fabricates a confidence
//! percentage client-side; the stub answers a constant age offline.
//!
//! ERROR HANDLING
//! ==============
//! History is written only after the predictor succeeds, so any failure
//! leaves stored history exactly as it was. There is no retry.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use records::dataurl::{self, DataUrl, DataUrlError};
use records::wire::{IMAGE_FIELD, PredictResponse};
use records::{EntryShape, HistoryEntry, HistoryError, HistoryStore, Prediction, Storage};
use reqwest::multipart::{Form, Part};
use serde_json::Number;
use time::OffsetDateTime;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/predict";
pub const DEFAULT_STUB_AGE: u32 = 25;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint answered HTTP {0}")]
    Status(u16),
    #[error("response has no numeric `age`: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no image selected")]
    EmptyImage,
    #[error("could not read image {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid data URL: {0}")]
    DataUrl(#[from] DataUrlError),
    #[error("Failed to predict age. ({0})")]
    Predict(#[from] PredictError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

// =============================================================================
// CAPTURED IMAGE
// =============================================================================

/// Image held in memory between capture and prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl CapturedImage {
    /// Read an image file; the MIME type is sniffed from its contents.
    pub fn from_path(path: &Path) -> Result<Self, CaptureError> {
        let bytes = std::fs::read(path).map_err(|source| CaptureError::Read { path: path.display().to_string(), source })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
        let mime = dataurl::sniff_mime(&bytes).to_owned();
        Ok(Self { file_name, mime, bytes })
    }

    /// Take a data URL, as produced by a webcam screenshot.
    pub fn from_data_url(raw: &str) -> Result<Self, CaptureError> {
        let url = DataUrl::parse(raw)?;
        let extension = url.mime.rsplit('/').next().filter(|ext| !ext.is_empty()).unwrap_or("bin");
        Ok(Self { file_name: format!("webcam.{extension}"), mime: url.mime, bytes: url.bytes })
    }

    #[must_use]
    pub fn to_data_url(&self) -> String {
        DataUrl::new(self.mime.clone(), self.bytes.clone()).encode()
    }
}

// =============================================================================
// PREDICTORS
// =============================================================================

#[async_trait]
pub trait Predictor: Send + Sync {
    /// Shape new history entries take when the caller does not choose one.
    fn entry_shape(&self) -> EntryShape;

    async fn predict(&self, image: &CapturedImage) -> Result<Prediction, PredictError>;
}

/// Posts the image to the predict endpoint.
pub struct HttpPredictor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPredictor {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PredictError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint: endpoint.into() })
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    fn entry_shape(&self) -> EntryShape {
        EntryShape::Scored
    }

    async fn predict(&self, image: &CapturedImage) -> Result<Prediction, PredictError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        debug!(endpoint = %self.endpoint, bytes = image.bytes.len(), "posting image");
        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PredictError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        let age = parse_age(&body)?;
        Ok(Prediction { age, confidence: Some(Number::from(fabricate_confidence())) })
    }
}

/// Constant answer, no network.
pub struct StubPredictor {
    pub age: u32,
}

impl Default for StubPredictor {
    fn default() -> Self {
        Self { age: DEFAULT_STUB_AGE }
    }
}

#[async_trait]
impl Predictor for StubPredictor {
    fn entry_shape(&self) -> EntryShape {
        EntryShape::Dated
    }

    async fn predict(&self, _image: &CapturedImage) -> Result<Prediction, PredictError> {
        Ok(Prediction { age: Number::from(self.age), confidence: None })
    }
}

/// Read `age` from a `/predict` response body. Fractional ages are kept.
pub(crate) fn parse_age(body: &[u8]) -> Result<Number, PredictError> {
    Ok(serde_json::from_slice::<PredictResponse>(body)?.age)
}

/// Cosmetic confidence percentage in `[80, 100)`; not a model output.
pub(crate) fn fabricate_confidence() -> u32 {
    rand::rng().random_range(80..100)
}

// =============================================================================
// FLOW
// =============================================================================

/// Predict `image` and, on success, prepend the result to history.
pub async fn predict_and_record<S: Storage>(
    predictor: &dyn Predictor,
    store: &mut HistoryStore<S>,
    image: &CapturedImage,
    shape: Option<EntryShape>,
) -> Result<HistoryEntry, CaptureError> {
    if image.bytes.is_empty() {
        return Err(CaptureError::EmptyImage);
    }

    let prediction = predictor.predict(image).await?;
    let shape = shape.unwrap_or_else(|| predictor.entry_shape());
    let entry = store.record(prediction, image.to_data_url(), shape, OffsetDateTime::now_utc())?;
    info!(age = %entry.age(), file = %image.file_name, "prediction stored");
    Ok(entry)
}

#[cfg(test)]
#[path = "capture_test.rs"]
mod tests;
