//! Crop Recommendation Inference Service
//!
//! Loads a pre-trained crop classifier and serves soil/climate-based crop
//! recommendations over HTTP, with confidence tiers and alternative
//! candidates.
//!
//! Module layout follows the pipeline:
//! - `validation`: untyped JSON → typed `MeasurementSet` (+ optional location)
//! - `features`: `MeasurementSet` → fixed-order feature vector
//! - `model`: classifier backends, artifact loading, shared model slot
//! - `recommend`: confidence tiers, alternative ranking, result composition
//! - `knowledge`: static per-crop reference data
//! - `api_server`: axum routing and status-code policy

pub mod api_server;
pub mod features;
pub mod knowledge;
pub mod model;
pub mod recommend;
pub mod validation;

// Re-export commonly used types
pub use api_server::{create_router, AppState};
pub use features::{assemble, FeatureVector, FEATURE_ORDER};
pub use model::{LoadedModel, ModelArtifact, ModelHandle, PredictError};
pub use recommend::{recommend, AlternativeCrop, ConfidenceTier, Recommendation, MODEL_VERSION};
pub use validation::{validate, GeoPoint, MeasurementSet, ValidationError};

/// Service identifier reported by the health and status endpoints.
pub const SERVICE_NAME: &str = "crop-recommendation-ml";
