//! Axum API Server Module
//!
//! Thin HTTP layer over the prediction pipeline: request/response mapping,
//! status-code policy, and the model lifecycle endpoints. All non-trivial
//! logic lives in `validation`, `model`, and `recommend`.
//!
//! Status mapping: caller-input faults → 400, model not loaded → 503, any
//! other pipeline failure → 500. Every `/predict` failure body carries
//! elapsed time and a timestamp, same as the success path.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::knowledge;
use crate::model::ModelHandle;
use crate::recommend::{self, round2, MODEL_VERSION};
use crate::validation;
use crate::SERVICE_NAME;

// ============================================================================
// Application State
// ============================================================================

/// Shared state: just the model slot. Requests treat the reference they
/// clone out as immutable; `/reload` is the only writer.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelHandle>,
}

impl AppState {
    /// Create state bound to a model artifact path. Does not load; call
    /// `ModelHandle::reload` (or hit `/reload`) to populate the slot.
    pub fn new(model_path: impl Into<std::path::PathBuf>) -> Self {
        Self { model: Arc::new(ModelHandle::new(model_path)) }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Service endpoints
        .route("/health", get(health_check))
        .route("/status", get(service_status))

        // Prediction pipeline
        .route("/predict", post(predict))

        // Model lifecycle
        .route("/reload", post(reload_model))

        // Static crop reference data (JSON)
        .route("/api/crops/:name", get(get_crop_info))

        .fallback(not_found)

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Allow all origins (adjust for production)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "model_loaded": state.model.is_loaded(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn service_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "running",
        "service": SERVICE_NAME,
        "version": MODEL_VERSION,
        "model_loaded": state.model.is_loaded(),
        "model_path": state.model.path().display().to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Main prediction endpoint.
///
/// Pipeline order matters: validation completes before the model slot is
/// read, so invalid input never incurs model-invocation cost, and the model
/// reference is taken before feature assembly so a missing model
/// short-circuits everything downstream.
async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let started = Instant::now();

    let body = match payload {
        Ok(Json(value)) => value,
        Err(JsonRejection::MissingJsonContentType(_)) => {
            return failure(
                StatusCode::BAD_REQUEST,
                "Content-Type must be application/json",
                started,
            );
        }
        Err(rejection) => {
            return failure(StatusCode::BAD_REQUEST, &rejection.body_text(), started);
        }
    };

    let Some(map) = body.as_object() else {
        return failure(StatusCode::BAD_REQUEST, "Request body must be a JSON object", started);
    };

    let (measurements, location) = match validation::validate(map) {
        Ok(validated) => validated,
        Err(e) => {
            tracing::warn!("Validation failed: {}", e);
            return failure(StatusCode::BAD_REQUEST, &e.to_string(), started);
        }
    };

    // One reference per request: a concurrent reload does not affect us past
    // this point.
    let Some(model) = state.model.current() else {
        return failure(StatusCode::SERVICE_UNAVAILABLE, "ML model is not loaded", started);
    };

    match recommend::recommend(&model, &measurements, location, started) {
        Ok(result) => {
            tracing::info!(
                "Prediction successful: {} (confidence: {})",
                result.crop,
                result.confidence.display_name()
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            tracing::error!("Prediction failed: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string(), started)
        }
    }
}

/// Reload the model artifact from disk, replacing the current reference.
async fn reload_model(State(state): State<AppState>) -> Response {
    match state.model.reload() {
        Ok(()) => Json(serde_json::json!({
            "message": "Model reloaded successfully",
            "model_loaded": true,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Model reload failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to reload model: {}", e),
                })),
            )
                .into_response()
        }
    }
}

/// Static crop reference lookup. Case-insensitive; unknown labels get the
/// fixed "not available" entry, never a 404.
async fn get_crop_info(Path(name): Path<String>) -> impl IntoResponse {
    let info = knowledge::crop_info(&name);
    Json(serde_json::json!({
        "crop": name.trim().to_lowercase(),
        "description": info.description,
        "optimal_temp": info.optimal_temp,
        "optimal_ph": info.optimal_ph,
        "water_requirement": info.water_requirement,
        "season": info.season,
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Endpoint not found" })),
    )
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Failure body for `/predict`: error message plus the timing metadata the
/// success path also reports.
fn failure(status: StatusCode, message: &str, started: Instant) -> Response {
    let processing_time_ms = round2(started.elapsed().as_secs_f64() * 1000.0);
    (
        status,
        Json(serde_json::json!({
            "error": message,
            "processing_time_ms": processing_time_ms,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}
