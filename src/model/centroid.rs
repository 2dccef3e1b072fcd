//! Nearest-Centroid Backend
//!
//! One mean feature vector per class; prediction is the class with the
//! smallest Euclidean distance. This backend has no probability interface,
//! which exercises the pipeline's documented fixed-confidence fallback.

use super::PredictError;
use crate::features::FeatureVector;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Per-class mean vectors, indexed by class. `centroids[i]` belongs to
/// `classes[i]` in the surrounding artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidModel {
    pub centroids: Vec<FeatureVector>,
}

impl CentroidModel {
    pub(super) fn check(&self, class_count: usize) -> Result<()> {
        if self.centroids.is_empty() {
            anyhow::bail!("centroid model has no centroids");
        }
        if self.centroids.len() != class_count {
            anyhow::bail!(
                "centroid count {} does not match class count {}",
                self.centroids.len(),
                class_count
            );
        }
        Ok(())
    }

    /// Class index of the nearest centroid. Ties resolve to the earliest
    /// class index.
    pub(super) fn nearest(&self, x: &FeatureVector) -> Result<usize, PredictError> {
        self.centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, squared_distance(x, c)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .ok_or_else(|| PredictError::Prediction("centroid model has no centroids".to_string()))
    }
}

fn squared_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
