//! Recommendation Pipeline
//!
//! Runs a validated measurement set through the loaded classifier and
//! composes the final structured result: top crop, confidence tier and raw
//! score, ranked alternatives, a human-readable rationale, timing metadata,
//! and the optional geolocation annotation.

pub mod alternatives;
pub mod confidence;

pub use alternatives::{rank_alternatives, AlternativeCrop};
pub use confidence::ConfidenceTier;

use crate::features;
use crate::model::{LoadedModel, PredictError};
use crate::validation::{GeoPoint, MeasurementSet};
use serde::Serialize;
use std::time::Instant;

/// Fixed model version string reported with every result. Independent of
/// the loaded artifact's internal versioning.
pub const MODEL_VERSION: &str = "1.0.0";

/// Confidence reported when the backend has no probability interface.
///
/// This is a fixed placeholder, not a measurement: probability-less backends
/// stay usable at the cost of an uninformative confidence signal. Kept for
/// compatibility with the service's historical behavior.
const FALLBACK_SCORE: f64 = 0.85;

/// The complete prediction result, serialized directly as the success
/// response body. Built once per request and discarded.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub crop: String,
    pub confidence: ConfidenceTier,
    pub confidence_score: f64,
    pub alternative_crops: Vec<AlternativeCrop>,
    pub reasoning: String,
    pub model_version: String,
    pub timestamp: String,
    pub processing_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Run the prediction pipeline end to end.
///
/// The caller resolves the model reference before calling (so a missing
/// model short-circuits ahead of feature assembly) and passes the request
/// arrival instant; elapsed time covers arrival through result assembly.
pub fn recommend(
    model: &LoadedModel,
    measurements: &MeasurementSet,
    location: Option<GeoPoint>,
    started: Instant,
) -> Result<Recommendation, PredictError> {
    let x = features::assemble(measurements);

    let crop = model.predict(&x)?;

    let (confidence_score, confidence, alternative_crops) = if model.supports_probabilities() {
        let distribution = model.class_probabilities(&x)?;
        let top_score = distribution
            .iter()
            .map(|(_, p)| *p)
            .fold(0.0_f64, f64::max);
        (
            top_score,
            ConfidenceTier::from_score(top_score),
            rank_alternatives(&distribution),
        )
    } else {
        // Documented fallback: fixed score and tier, no alternatives.
        (FALLBACK_SCORE, ConfidenceTier::High, Vec::new())
    };

    let reasoning = build_reasoning(measurements, location.as_ref());
    let processing_time_ms = round2(started.elapsed().as_secs_f64() * 1000.0);

    Ok(Recommendation {
        crop,
        confidence,
        confidence_score,
        alternative_crops,
        reasoning,
        model_version: MODEL_VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        processing_time_ms,
        location,
    })
}

/// Interpolate all seven measurements into the rationale; append the
/// coordinate sentence (6 decimal places) when a location was supplied.
fn build_reasoning(m: &MeasurementSet, location: Option<&GeoPoint>) -> String {
    let mut reasoning = format!(
        "Based on soil analysis: N={}, P={}, K={}, pH={}, and climate conditions: \
         temperature={}°C, humidity={}%, rainfall={}mm",
        m.n, m.p, m.k, m.ph, m.temperature, m.humidity, m.rainfall
    );
    if let Some(point) = location {
        reasoning.push_str(&format!(
            " Location: {:.6}°N, {:.6}°E.",
            point.latitude, point.longitude
        ));
    }
    reasoning
}

/// Round to 2 decimal places for reporting.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
