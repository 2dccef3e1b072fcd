//! Model Artifact and Shared Model Slot
//!
//! The classifier is loaded from a serde-JSON artifact on disk. Two backend
//! kinds exist: a random forest (exposes per-class probabilities) and a
//! nearest-centroid model (top label only). The pipeline queries the
//! probability capability explicitly instead of probing for failures.
//!
//! `ModelHandle` is the single shared model slot: `reload` replaces the whole
//! `Arc` reference, and a request clones the `Arc` out exactly once at the
//! start of its pipeline. A reload racing an in-flight prediction means that
//! request finishes on whichever reference it took; there is never a torn
//! read, and we make no stronger atomicity promise.

mod centroid;
mod forest;

pub use centroid::CentroidModel;
pub use forest::{DecisionTree, ForestModel, TreeNode};

use crate::features::FeatureVector;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Prediction-time failures. Validation failures live in `validation`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// No model in the shared slot. Resolved externally via `/reload`.
    #[error("ML model is not loaded")]
    ModelNotLoaded,

    /// Any backend failure during inference, with the wrapped message.
    #[error("Prediction failed: {0}")]
    Prediction(String),
}

/// On-disk model artifact.
///
/// `version` identifies the artifact itself and is logged at load time; the
/// `model_version` reported in responses is the fixed service string, which
/// is independent of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    /// Known class labels. Backend class indices refer into this list, and
    /// probability distributions are emitted in this order.
    pub classes: Vec<String>,
    #[serde(flatten)]
    pub backend: Backend,
}

/// Concrete classifier backends, tagged by `kind` in the artifact JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    Forest(ForestModel),
    Centroid(CentroidModel),
}

impl ModelArtifact {
    /// Structural checks that make later inference infallible on well-formed
    /// input: class indices in range, feature indices < 7, tree child links
    /// strictly forward (so traversal terminates).
    fn check(&self) -> Result<()> {
        if self.classes.is_empty() {
            anyhow::bail!("model artifact has no classes");
        }
        match &self.backend {
            Backend::Forest(forest) => forest.check(self.classes.len()),
            Backend::Centroid(centroid) => centroid.check(self.classes.len()),
        }
    }
}

/// A validated, in-memory model ready for inference.
#[derive(Debug)]
pub struct LoadedModel {
    artifact: ModelArtifact,
}

impl LoadedModel {
    /// Wrap and validate an artifact.
    pub fn new(artifact: ModelArtifact) -> Result<Self> {
        artifact.check()?;
        Ok(Self { artifact })
    }

    /// Read and validate an artifact file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact: {:?}", path))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&contents).with_context(|| "Failed to parse model JSON")?;
        Self::new(artifact)
    }

    /// Artifact version string (not the service model version).
    pub fn artifact_version(&self) -> &str {
        &self.artifact.version
    }

    /// Known class labels, in artifact order.
    pub fn classes(&self) -> &[String] {
        &self.artifact.classes
    }

    /// Whether this backend can produce a full class probability
    /// distribution. Queried up front; never inferred from failures.
    pub fn supports_probabilities(&self) -> bool {
        matches!(self.artifact.backend, Backend::Forest(_))
    }

    /// Top predicted label for a feature vector.
    pub fn predict(&self, x: &FeatureVector) -> Result<String, PredictError> {
        let index = match &self.artifact.backend {
            Backend::Forest(forest) => {
                let probabilities = forest.class_shares(x, self.artifact.classes.len())?;
                argmax(&probabilities)
            }
            Backend::Centroid(centroid) => centroid.nearest(x)?,
        };
        self.artifact
            .classes
            .get(index)
            .cloned()
            .ok_or_else(|| PredictError::Prediction(format!("class index {} out of range", index)))
    }

    /// Full probability distribution, one entry per known class, in artifact
    /// class order. Only meaningful when `supports_probabilities()` is true.
    pub fn class_probabilities(
        &self,
        x: &FeatureVector,
    ) -> Result<Vec<(String, f64)>, PredictError> {
        match &self.artifact.backend {
            Backend::Forest(forest) => {
                let shares = forest.class_shares(x, self.artifact.classes.len())?;
                Ok(self
                    .artifact
                    .classes
                    .iter()
                    .zip(shares)
                    .map(|(label, share)| (label.clone(), share))
                    .collect())
            }
            Backend::Centroid(_) => Err(PredictError::Prediction(
                "model backend does not expose probabilities".to_string(),
            )),
        }
    }
}

/// Index of the maximum value; ties resolve to the earliest index, which is
/// the earliest entry in the artifact's class list.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Shared model slot: the only lifecycle transitions are load and reload,
/// both of which replace the entire reference.
#[derive(Debug)]
pub struct ModelHandle {
    path: PathBuf,
    slot: RwLock<Option<Arc<LoadedModel>>>,
}

impl ModelHandle {
    /// Create an empty handle bound to an artifact path. Nothing is loaded
    /// until `reload` is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), slot: RwLock::new(None) }
    }

    /// Artifact path this handle loads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// (Re)load the artifact from disk, replacing any prior model. On
    /// failure the prior model (if any) stays in place.
    pub fn reload(&self) -> Result<()> {
        let model = LoadedModel::from_path(&self.path)?;
        tracing::info!(
            "Model loaded from {:?} (artifact version {}, {} classes, probabilities: {})",
            self.path,
            model.artifact_version(),
            model.classes().len(),
            model.supports_probabilities(),
        );
        *self.write_slot() = Some(Arc::new(model));
        Ok(())
    }

    /// Install an already-built model, replacing any prior one.
    pub fn install(&self, model: LoadedModel) {
        *self.write_slot() = Some(Arc::new(model));
    }

    /// Clone out the current model reference, if any. Callers take this once
    /// per request and never re-read the slot mid-pipeline.
    pub fn current(&self) -> Option<Arc<LoadedModel>> {
        self.read_slot().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.read_slot().is_some()
    }

    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<LoadedModel>>> {
        match self.slot.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_slot(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<LoadedModel>>> {
        match self.slot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Test fixture: a forest of single-leaf trees where `votes[i]` trees vote
/// for class `i`, producing the same distribution for every input.
#[cfg(test)]
pub(crate) fn constant_forest(classes: &[&str], votes: &[usize]) -> ModelArtifact {
    let trees = votes
        .iter()
        .enumerate()
        .flat_map(|(class, count)| {
            std::iter::repeat(DecisionTree { nodes: vec![TreeNode::Leaf { class }] })
                .take(*count)
        })
        .collect();
    ModelArtifact {
        version: "test".to_string(),
        classes: classes.iter().map(|c| c.to_string()).collect(),
        backend: Backend::Forest(ForestModel { trees }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const X: FeatureVector = [80.0, 40.0, 30.0, 25.0, 70.0, 6.5, 150.0];

    #[test]
    fn test_forest_shares_follow_vote_counts() {
        let model =
            LoadedModel::new(constant_forest(&["chickpea", "maize", "rice"], &[1, 3, 6])).unwrap();
        let dist = model.class_probabilities(&X).unwrap();
        assert_eq!(dist.len(), 3);
        assert_relative_eq!(dist[0].1, 0.1);
        assert_relative_eq!(dist[1].1, 0.3);
        assert_relative_eq!(dist[2].1, 0.6);
        assert_eq!(model.predict(&X).unwrap(), "rice");
    }

    #[test]
    fn test_forest_supports_probabilities() {
        let model = LoadedModel::new(constant_forest(&["a", "b"], &[1, 1])).unwrap();
        assert!(model.supports_probabilities());
    }

    #[test]
    fn test_tied_argmax_takes_earliest_class() {
        let model = LoadedModel::new(constant_forest(&["b", "a"], &[2, 2])).unwrap();
        assert_eq!(model.predict(&X).unwrap(), "b");
    }

    #[test]
    fn test_empty_classes_rejected() {
        let artifact = ModelArtifact {
            version: "test".to_string(),
            classes: vec![],
            backend: Backend::Forest(ForestModel { trees: vec![] }),
        };
        assert!(LoadedModel::new(artifact).is_err());
    }

    #[test]
    fn test_artifact_round_trips_through_json() {
        let artifact = constant_forest(&["rice", "wheat"], &[3, 1]);
        let json = serde_json::to_string(&artifact).unwrap();
        assert!(json.contains("\"kind\":\"forest\""));
        let back: ModelArtifact = serde_json::from_str(&json).unwrap();
        let model = LoadedModel::new(back).unwrap();
        assert_eq!(model.predict(&X).unwrap(), "rice");
    }

    #[test]
    fn test_handle_reload_failure_keeps_prior_model() {
        let handle = ModelHandle::new("/nonexistent/crop_model.json");
        let model = LoadedModel::new(constant_forest(&["rice"], &[1])).unwrap();
        handle.install(model);
        assert!(handle.reload().is_err());
        assert!(handle.is_loaded(), "failed reload must not evict the prior model");
    }

    #[test]
    fn test_handle_starts_empty() {
        let handle = ModelHandle::new("/nonexistent/crop_model.json");
        assert!(!handle.is_loaded());
        assert!(handle.current().is_none());
    }
}
