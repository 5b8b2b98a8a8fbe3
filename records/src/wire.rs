//! JSON bodies exchanged with the predict endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Multipart field carrying the image on `POST /predict`.
pub const IMAGE_FIELD: &str = "image";

/// Multipart fields of `POST /api/v1/predict-age`, in model input order.
pub const VIEW_FIELDS: [&str; 3] = ["front_view", "left_side", "right_side"];

/// Response of `POST /predict`. Any JSON number is accepted as the age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub age: Number,
}

/// Response of `POST /api/v1/predict-age`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgePredictionResponse {
    pub predicted_age: u32,
    /// Between 0 and 1.
    pub confidence_score: f64,
    pub status: String,
    pub message: Option<String>,
}

/// Error body returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_loaded: bool,
    pub model: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub service: String,
}
