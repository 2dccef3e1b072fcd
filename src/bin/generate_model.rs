// Synthetic Model Generator
//
// Purpose: Write a synthetic pre-trained model artifact for development and
// integration testing when no real trained model exists. Each tree encodes
// simple agronomic rules (N/P/temperature for rice, P/K/cool weather for
// wheat, etc.) with jittered thresholds so the forest produces
// non-degenerate probability distributions.
//
// Usage: cargo run --bin generate_model [out_dir]   (default: model/)

use anyhow::{Context, Result};
use crop_recommender::model::{
    Backend, CentroidModel, DecisionTree, ForestModel, LoadedModel, ModelArtifact, TreeNode,
};
use crop_recommender::FeatureVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;

/// All crop labels the synthetic model knows, sorted the way a trained
/// classifier reports its classes.
const CROPS: [&str; 23] = [
    "apple", "banana", "blackgram", "chickpea", "coconut", "coffee", "cotton", "grapes",
    "jute", "kidneybeans", "lentil", "maize", "mango", "mothbeans", "mungbean", "muskmelon",
    "orange", "papaya", "pigeonpeas", "pomegranate", "rice", "watermelon", "wheat",
];

const TREE_COUNT: usize = 100;
const SAMPLE_COUNT: usize = 1000;

/// Feature indices in training order: [N, P, K, temperature, humidity, ph, rainfall]
const N: usize = 0;
const P: usize = 1;
const K: usize = 2;
const TEMPERATURE: usize = 3;
const PH: usize = 5;
const RAINFALL: usize = 6;

/// Valid measurement ranges, used to draw synthetic samples.
const RANGES: [(f64, f64); 7] = [
    (0.0, 140.0),
    (5.0, 145.0),
    (5.0, 205.0),
    (8.8, 43.7),
    (14.0, 100.0),
    (3.5, 10.0),
    (20.0, 300.0),
];

fn main() -> Result<()> {
    let out_dir = std::env::args().nth(1).unwrap_or_else(|| "model".to_string());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir))?;

    let mut rng = StdRng::seed_from_u64(42);

    let forest = forest_artifact(&mut rng);
    write_artifact(&forest, Path::new(&out_dir).join("crop_model.json"))?;

    let centroid = centroid_artifact(&mut rng);
    write_artifact(&centroid, Path::new(&out_dir).join("crop_model_centroid.json"))?;

    Ok(())
}

/// Validate and write one artifact.
fn write_artifact(artifact: &ModelArtifact, path: std::path::PathBuf) -> Result<()> {
    // Round-trip through the loader so a malformed generator fails here,
    // not at service startup.
    LoadedModel::new(artifact.clone())
        .with_context(|| format!("Generated artifact is invalid: {:?}", path))?;

    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
    println!("Wrote {:?} ({} classes)", path, artifact.classes.len());
    Ok(())
}

fn class_index(name: &str) -> usize {
    CROPS.iter().position(|c| *c == name).unwrap_or(0)
}

// ============================================================================
// Forest Artifact
// ============================================================================

fn forest_artifact(rng: &mut StdRng) -> ModelArtifact {
    let trees = (0..TREE_COUNT).map(|_| rule_tree(rng)).collect();
    ModelArtifact {
        version: "synthetic-forest-1".to_string(),
        classes: CROPS.iter().map(|c| c.to_string()).collect(),
        backend: Backend::Forest(ForestModel { trees }),
    }
}

/// One tree encoding the rule cascade with jittered thresholds.
///
/// Rules, first match wins:
///   N > 70 and P > 40 and temperature > 25        -> rice
///   P > 60 and K > 100 and temperature < 20       -> wheat
///   N > 80 and rainfall > 150                     -> maize
///   ph > 7.0 and temperature > 30                 -> cotton
///   otherwise                                     -> per-tree random crop
///
/// Failed conditions jump forward to the next rule's subtree (nodes may
/// share children; links only ever point forward).
fn rule_tree(rng: &mut StdRng) -> DecisionTree {
    let fallback = rng.gen_range(0..CROPS.len());
    let mut jitter = |threshold: f64| threshold * rng.gen_range(0.9..1.1);

    let nodes = vec![
        // Rule 1: rice
        TreeNode::Branch { feature: N, threshold: jitter(70.0), left: 4, right: 1 },
        TreeNode::Branch { feature: P, threshold: jitter(40.0), left: 4, right: 2 },
        TreeNode::Branch { feature: TEMPERATURE, threshold: jitter(25.0), left: 4, right: 3 },
        TreeNode::Leaf { class: class_index("rice") },
        // Rule 2: wheat (temperature < 20 succeeds on the left branch)
        TreeNode::Branch { feature: P, threshold: jitter(60.0), left: 8, right: 5 },
        TreeNode::Branch { feature: K, threshold: jitter(100.0), left: 8, right: 6 },
        TreeNode::Branch { feature: TEMPERATURE, threshold: jitter(20.0), left: 7, right: 8 },
        TreeNode::Leaf { class: class_index("wheat") },
        // Rule 3: maize
        TreeNode::Branch { feature: N, threshold: jitter(80.0), left: 11, right: 9 },
        TreeNode::Branch { feature: RAINFALL, threshold: jitter(150.0), left: 11, right: 10 },
        TreeNode::Leaf { class: class_index("maize") },
        // Rule 4: cotton
        TreeNode::Branch { feature: PH, threshold: jitter(7.0), left: 14, right: 12 },
        TreeNode::Branch { feature: TEMPERATURE, threshold: jitter(30.0), left: 14, right: 13 },
        TreeNode::Leaf { class: class_index("cotton") },
        // Fallback: this tree's random vote
        TreeNode::Leaf { class: fallback },
    ];

    DecisionTree { nodes }
}

// ============================================================================
// Centroid Artifact
// ============================================================================

/// Per-class mean vectors over rule-labeled uniform samples. This backend
/// exposes no probabilities, which exercises the service's fixed-confidence
/// fallback path.
fn centroid_artifact(rng: &mut StdRng) -> ModelArtifact {
    let mut sums: Vec<[f64; 7]> = vec![[0.0; 7]; CROPS.len()];
    let mut counts = vec![0usize; CROPS.len()];

    for _ in 0..SAMPLE_COUNT {
        let mut x: FeatureVector = [0.0; 7];
        for (value, (min, max)) in x.iter_mut().zip(RANGES.iter()) {
            *value = rng.gen_range(*min..*max);
        }
        let class = rule_label(&x, rng);
        for (sum, value) in sums[class].iter_mut().zip(x.iter()) {
            *sum += value;
        }
        counts[class] += 1;
    }

    let mut classes = Vec::new();
    let mut centroids = Vec::new();
    for (i, crop) in CROPS.iter().enumerate() {
        if counts[i] == 0 {
            continue;
        }
        let mut centroid = sums[i];
        for value in centroid.iter_mut() {
            *value /= counts[i] as f64;
        }
        classes.push(crop.to_string());
        centroids.push(centroid);
    }

    ModelArtifact {
        version: "synthetic-centroid-1".to_string(),
        classes,
        backend: Backend::Centroid(CentroidModel { centroids }),
    }
}

/// The un-jittered rule cascade used for labeling samples.
fn rule_label(x: &FeatureVector, rng: &mut StdRng) -> usize {
    if x[N] > 70.0 && x[P] > 40.0 && x[TEMPERATURE] > 25.0 {
        class_index("rice")
    } else if x[P] > 60.0 && x[K] > 100.0 && x[TEMPERATURE] < 20.0 {
        class_index("wheat")
    } else if x[N] > 80.0 && x[RAINFALL] > 150.0 {
        class_index("maize")
    } else if x[PH] > 7.0 && x[TEMPERATURE] > 30.0 {
        class_index("cotton")
    } else {
        rng.gen_range(0..CROPS.len())
    }
}
