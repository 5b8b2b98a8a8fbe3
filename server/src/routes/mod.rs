//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser front ends and the CLI post images to `/predict`; the
//! multi-angle API lives under `/api/v1`. CORS is limited to the configured
//! front-end origins and request bodies are capped relative to the per-image
//! upload limit.

pub mod predict;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::response::Json;
use axum::routing::{get, post};
use records::wire::{Health, VIEW_FIELDS};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "age-prediction-api";

/// Multipart framing allowance on top of the raw image bytes.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_file_size
        .saturating_mul(VIEW_FIELDS.len())
        .saturating_add(BODY_OVERHEAD);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict::predict))
        .route("/api/v1/predict-age", post(predict::predict_age))
        .route("/api/v1/model-status", get(predict::model_status))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Age Prediction API is running" }))
}

async fn health() -> Json<Health> {
    Json(Health { status: "healthy".to_owned(), service: SERVICE_NAME.to_owned() })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
