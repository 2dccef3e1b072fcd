//! Random Forest Backend
//!
//! Index-based binary decision trees over the 7 input features. Each tree
//! votes for one class; the per-class vote share over all trees is the
//! probability distribution (the same shape a scikit-learn RandomForest
//! reports from `predict_proba`).

use super::PredictError;
use crate::features::{FeatureVector, FEATURE_COUNT};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A single tree node. Branches send `x[feature] <= threshold` left,
/// otherwise right. Child links are indices into the tree's node list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Branch { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { class: usize },
}

/// One decision tree. Node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walk from the root to a leaf, returning the class index voted for.
    fn vote(&self, x: &FeatureVector) -> Result<usize, PredictError> {
        let mut index = 0;
        loop {
            let node = self.nodes.get(index).ok_or_else(|| {
                PredictError::Prediction(format!("tree node index {} out of range", index))
            })?;
            match node {
                TreeNode::Leaf { class } => return Ok(*class),
                TreeNode::Branch { feature, threshold, left, right } => {
                    let value = x.get(*feature).ok_or_else(|| {
                        PredictError::Prediction(format!("feature index {} out of range", feature))
                    })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// A forest of decision trees with majority-vote prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    /// Structural validation at load time. Child links must point strictly
    /// forward so traversal always terminates.
    pub(super) fn check(&self, class_count: usize) -> Result<()> {
        if self.trees.is_empty() {
            anyhow::bail!("forest model has no trees");
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                anyhow::bail!("tree {} has no nodes", t);
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Leaf { class } => {
                        if *class >= class_count {
                            anyhow::bail!(
                                "tree {} node {}: class index {} out of range ({} classes)",
                                t, i, class, class_count
                            );
                        }
                    }
                    TreeNode::Branch { feature, left, right, .. } => {
                        if *feature >= FEATURE_COUNT {
                            anyhow::bail!(
                                "tree {} node {}: feature index {} out of range",
                                t, i, feature
                            );
                        }
                        if *left <= i || *right <= i || *left >= tree.nodes.len()
                            || *right >= tree.nodes.len()
                        {
                            anyhow::bail!(
                                "tree {} node {}: child links must point forward within the tree",
                                t, i
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Vote share per class, indexed by class, summing to 1.0.
    pub(super) fn class_shares(
        &self,
        x: &FeatureVector,
        class_count: usize,
    ) -> Result<Vec<f64>, PredictError> {
        let mut votes = vec![0usize; class_count];
        for tree in &self.trees {
            let class = tree.vote(x)?;
            let slot = votes.get_mut(class).ok_or_else(|| {
                PredictError::Prediction(format!("class index {} out of range", class))
            })?;
            *slot += 1;
        }
        let total = self.trees.len() as f64;
        Ok(votes.into_iter().map(|v| v as f64 / total).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// One branch on temperature (feature 3): <= 20 votes class 0, else 1.
    fn temperature_tree() -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Branch { feature: 3, threshold: 20.0, left: 1, right: 2 },
                TreeNode::Leaf { class: 0 },
                TreeNode::Leaf { class: 1 },
            ],
        }
    }

    fn with_temperature(t: f64) -> FeatureVector {
        [80.0, 40.0, 30.0, t, 70.0, 6.5, 150.0]
    }

    #[test]
    fn test_branch_splits_on_threshold() {
        let tree = temperature_tree();
        assert_eq!(tree.vote(&with_temperature(15.0)).unwrap(), 0);
        assert_eq!(tree.vote(&with_temperature(25.0)).unwrap(), 1);
        // Boundary goes left (x <= threshold)
        assert_eq!(tree.vote(&with_temperature(20.0)).unwrap(), 0);
    }

    #[test]
    fn test_shares_sum_to_one() {
        let forest = ForestModel {
            trees: vec![
                temperature_tree(),
                DecisionTree { nodes: vec![TreeNode::Leaf { class: 0 }] },
                DecisionTree { nodes: vec![TreeNode::Leaf { class: 1 }] },
            ],
        };
        let shares = forest.class_shares(&with_temperature(25.0), 2).unwrap();
        assert_relative_eq!(shares.iter().sum::<f64>(), 1.0);
        assert_relative_eq!(shares[0], 1.0 / 3.0);
        assert_relative_eq!(shares[1], 2.0 / 3.0);
    }

    #[test]
    fn test_check_rejects_backward_child_link() {
        let forest = ForestModel {
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Branch { feature: 0, threshold: 1.0, left: 0, right: 1 },
                    TreeNode::Leaf { class: 0 },
                ],
            }],
        };
        assert!(forest.check(2).is_err());
    }

    #[test]
    fn test_check_rejects_bad_feature_index() {
        let forest = ForestModel {
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Branch { feature: 7, threshold: 1.0, left: 1, right: 2 },
                    TreeNode::Leaf { class: 0 },
                    TreeNode::Leaf { class: 1 },
                ],
            }],
        };
        assert!(forest.check(2).is_err());
    }

    #[test]
    fn test_check_rejects_leaf_class_out_of_range() {
        let forest = ForestModel {
            trees: vec![DecisionTree { nodes: vec![TreeNode::Leaf { class: 5 }] }],
        };
        assert!(forest.check(2).is_err());
    }
}
