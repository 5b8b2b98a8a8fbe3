//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the loaded age model and the configuration handlers consult for
//! upload limits. Both are immutable after startup.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::model::AgeModel;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn AgeModel>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(model: Arc<dyn AgeModel>, config: ServerConfig) -> Self {
        Self { model, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
