//! Feature Assembly
//!
//! Maps a validated `MeasurementSet` to the fixed-order vector the classifier
//! was trained with. Pure and total: validation has already happened.

use crate::validation::MeasurementSet;

/// Number of model input features.
pub const FEATURE_COUNT: usize = 7;

/// Feature names in training order. This order is a hard invariant:
/// reordering silently corrupts predictions without any error surfacing.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Ordered numeric input to the classifier.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Assemble the feature vector in training order.
pub fn assemble(m: &MeasurementSet) -> FeatureVector {
    [m.n, m.p, m.k, m.temperature, m.humidity, m.ph, m.rainfall]
}
