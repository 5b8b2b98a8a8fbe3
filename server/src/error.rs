//! API error type and its HTTP mapping.
//!
//! Every failure leaves the service as `{ "error": <kind>, "message": <text> }`
//! with a status chosen by kind. Internal causes are logged, not echoed, for
//! model failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use records::wire::ErrorBody;

use crate::services::image::ImageError;
use crate::services::model::PredictionError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    TooLarge(String),
    #[error("worker task failed: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Image(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Prediction(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Image(_) => "Image Processing Error",
            Self::Prediction(_) => "Prediction Error",
            Self::Validation(_) => "Validation Error",
            Self::TooLarge(_) => "Payload Too Large",
            Self::Internal(_) => "Internal Error",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Image(e) => e.to_string(),
            Self::Validation(msg) | Self::TooLarge(msg) => msg.clone(),
            Self::Prediction(_) => "Failed to generate age prediction".to_owned(),
            Self::Internal(_) => "Internal server error".to_owned(),
        }
    }
}

impl ApiError {
    /// Classify a multipart failure by the status axum assigns it. Only an
    /// exceeded body limit is kept apart; anything else is a bad form.
    #[must_use]
    pub fn from_multipart(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge(message)
        } else {
            Self::Validation(message)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        let body = ErrorBody { error: self.kind().to_owned(), message: self.public_message() };
        (status, Json(body)).into_response()
    }
}
