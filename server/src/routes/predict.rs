//! Prediction routes.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::response::Json;
use records::wire::{AgePredictionResponse, IMAGE_FIELD, ModelStatus, PredictResponse, VIEW_FIELDS};
use tracing::info;

use crate::error::ApiError;
use crate::services::image::{self as image_svc, Upload};
use crate::services::model::{AgeEstimate, PredictionError};
use crate::state::AppState;

/// `POST /predict`: single image in field `image`, answers `{ "age": n }`.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let multipart = multipart.map_err(|rejection| ApiError::from_multipart(rejection.status(), rejection.body_text()))?;
    let uploads = collect_uploads(multipart, &[IMAGE_FIELD]).await?;
    let estimate = run_model(&state, uploads).await?;

    info!(age = estimate.age, "prediction served");
    Ok(Json(PredictResponse { age: estimate.age.into() }))
}

/// `POST /api/v1/predict-age`: front, left and right views.
pub async fn predict_age(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AgePredictionResponse>, ApiError> {
    let multipart = multipart.map_err(|rejection| ApiError::from_multipart(rejection.status(), rejection.body_text()))?;
    let uploads = collect_uploads(multipart, &VIEW_FIELDS).await?;
    info!(images = uploads.len(), "processing multi-angle prediction");
    let estimate = run_model(&state, uploads).await?;

    info!(age = estimate.age, confidence = estimate.confidence, "multi-angle prediction served");
    Ok(Json(AgePredictionResponse {
        predicted_age: estimate.age,
        confidence_score: estimate.confidence,
        status: "success".to_owned(),
        message: Some("Age prediction completed successfully".to_owned()),
    }))
}

/// `GET /api/v1/model-status`
pub async fn model_status(State(state): State<AppState>) -> Json<ModelStatus> {
    let loaded = state.model.is_loaded();
    Json(ModelStatus {
        model_loaded: loaded,
        model: state.model.name().to_owned(),
        status: if loaded { "ready" } else { "error" }.to_owned(),
    })
}

/// Read the named fields, in `wanted` order. Unknown fields are drained and
/// ignored; a repeated field keeps its first value.
pub(crate) async fn collect_uploads(mut multipart: Multipart, wanted: &[&str]) -> Result<Vec<Upload>, ApiError> {
    let mut found: Vec<Option<Upload>> = vec![None; wanted.len()];

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        let Some(slot) = wanted.iter().position(|w| *w == name) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| ApiError::from_multipart(e.status(), e.body_text()))?;
        if found[slot].is_none() {
            found[slot] = Some(Upload { label: name, content_type, bytes: bytes.to_vec() });
        }
    }

    found
        .into_iter()
        .zip(wanted)
        .map(|(upload, name)| upload.ok_or_else(|| ApiError::Validation(format!("missing field `{name}`"))))
        .collect()
}

/// Validate, preprocess on the blocking pool, and run the model.
async fn run_model(state: &AppState, uploads: Vec<Upload>) -> Result<AgeEstimate, ApiError> {
    if !state.model.is_loaded() {
        return Err(PredictionError::NotLoaded.into());
    }
    for upload in &uploads {
        image_svc::validate(upload, state.config.max_file_size)?;
    }

    let model = state.model.clone();
    tokio::task::spawn_blocking(move || {
        let processed = uploads
            .iter()
            .map(image_svc::preprocess)
            .collect::<Result<Vec<_>, _>>()?;
        Ok::<_, ApiError>(model.predict(&processed)?)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
}

#[cfg(test)]
#[path = "predict_test.rs"]
mod tests;
