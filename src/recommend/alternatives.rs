//! Alternative Candidate Ranking
//!
//! Surfaces the next-best classes alongside the primary recommendation:
//! sort by probability descending, take the top 3, drop the first entry
//! (the top pick itself), keep only entries strictly above the 0.10
//! probability floor, and annotate each survivor with its own tier.
//!
//! Tie handling: the distribution arrives in artifact class order and the
//! sort is stable, so exact probability ties break toward the earlier class
//! in the artifact's class list. That matches the top-pick tie rule, which
//! keeps the dropped first entry identical to the predicted label.

use super::confidence::ConfidenceTier;
use serde::Serialize;

/// Minimum probability (exclusive) for an alternative to be surfaced.
const PROBABILITY_FLOOR: f64 = 0.10;

/// How many ranked entries to consider, including the top pick.
const TOP_CANDIDATES: usize = 3;

/// A non-top candidate class offered alongside the primary recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeCrop {
    pub crop: String,
    pub confidence: ConfidenceTier,
    pub confidence_score: f64,
}

/// Rank alternatives from a full class probability distribution.
///
/// Returns at most 2 entries, ordered by descending probability. The first
/// ranked entry is dropped unconditionally as the already-reported top pick.
pub fn rank_alternatives(distribution: &[(String, f64)]) -> Vec<AlternativeCrop> {
    let mut ranked: Vec<&(String, f64)> = distribution.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(TOP_CANDIDATES)
        .skip(1)
        .filter(|(_, probability)| *probability > PROBABILITY_FLOOR)
        .map(|(crop, probability)| AlternativeCrop {
            crop: crop.clone(),
            confidence: ConfidenceTier::from_score(*probability),
            confidence_score: *probability,
        })
        .collect()
}
