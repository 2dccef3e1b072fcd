//! Confidence Tier Classification
//!
//! Maps a raw probability score in [0, 1] to a discrete tier using fixed
//! thresholds. Pure, total, deterministic.

use serde::Serialize;

/// Discrete confidence bucket reported alongside the raw score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceTier {
    /// score >= 0.8
    High,
    /// 0.6 <= score < 0.8
    Medium,
    /// score < 0.6
    Low,
}

impl ConfidenceTier {
    /// Classify a probability score. Thresholds are inclusive at the lower
    /// edge of each tier: 0.8 is High, 0.6 is Medium.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceTier::High
        } else if score >= 0.6 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(ConfidenceTier::from_score(1.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(0.85), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(0.8), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(0.7999), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(0.6), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(0.5999), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_score(0.0), ConfidenceTier::Low);
    }

    #[test]
    fn test_serializes_as_plain_label() {
        assert_eq!(serde_json::to_string(&ConfidenceTier::High).unwrap(), "\"High\"");
        assert_eq!(serde_json::to_string(&ConfidenceTier::Medium).unwrap(), "\"Medium\"");
        assert_eq!(serde_json::to_string(&ConfidenceTier::Low).unwrap(), "\"Low\"");
    }
}
