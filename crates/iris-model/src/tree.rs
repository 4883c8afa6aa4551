//! Decision tree and random forest classifiers.

use std::collections::BTreeMap;

use iris_core::{FeatureVector, InferenceError, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Internal split. Samples with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

/// Terminal node carrying the predicted class index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub class_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split(Split),
    Leaf(Leaf),
}

impl TreeNode {
    pub fn leaf(class_index: usize) -> Self {
        TreeNode::Leaf(Leaf { class_index })
    }

    pub fn split(feature: usize, threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split(Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Leaf nodes have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Split(split) => 1 + split.left.depth().max(split.right.depth()),
        }
    }

    /// Walks the tree for one sample.
    pub fn classify(&self, x: &FeatureVector) -> Result<usize, InferenceError> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return Ok(leaf.class_index),
                TreeNode::Split(split) => {
                    let value = x.get(split.feature).ok_or_else(|| {
                        InferenceError::new(format!(
                            "split references feature {} but input has {}",
                            split.feature, FEATURE_COUNT
                        ))
                    })?;
                    node = if value <= split.threshold { &split.left } else { &split.right };
                }
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        match self {
            TreeNode::Leaf(_) => Ok(()),
            TreeNode::Split(split) => {
                if split.feature >= FEATURE_COUNT {
                    return Err(ModelError::Invalid(format!(
                        "split feature {} out of range (expected < {})",
                        split.feature, FEATURE_COUNT
                    )));
                }
                if !split.threshold.is_finite() {
                    return Err(ModelError::Invalid(format!(
                        "split on feature {} has a non-finite threshold",
                        split.feature
                    )));
                }
                split.left.validate()?;
                split.right.validate()
            }
        }
    }
}

/// Single CART-style decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub root: TreeNode,
}

impl DecisionTree {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    pub fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        batch
            .iter()
            .map(|x| self.root.classify(x).map(|class| class as f64))
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        self.root.validate()
    }
}

/// Ensemble of trees combined by majority vote.
///
/// Ties go to the lowest class index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<TreeNode>,
}

impl RandomForest {
    pub fn new(trees: Vec<TreeNode>) -> Self {
        Self { trees }
    }

    pub fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        batch.iter().map(|x| self.vote(x).map(|class| class as f64)).collect()
    }

    fn vote(&self, x: &FeatureVector) -> Result<usize, InferenceError> {
        let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.classify(x)?).or_default() += 1;
        }

        // BTreeMap iterates in ascending class order; keep the first maximum
        let mut winner: Option<(usize, usize)> = None;
        for (class, count) in votes {
            if winner.map_or(true, |(_, best)| count > best) {
                winner = Some((class, count));
            }
        }

        winner
            .map(|(class, _)| class)
            .ok_or_else(|| InferenceError::new("random forest has no trees"))
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("random forest has no trees".into()));
        }
        self.trees.iter().try_for_each(TreeNode::validate)
    }
}
