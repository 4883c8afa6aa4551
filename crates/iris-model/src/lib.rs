//! Model artifact format and loader for iris-serve.
//!
//! Artifacts are JSON documents tagged by `kind`:
//!
//! ```json
//! { "kind": "decision_tree", "root": { "leaf": { "class_index": 0 } } }
//! { "kind": "random_forest", "trees": [ ... ] }
//! { "kind": "linear", "coefficients": [[...], ...], "intercepts": [...] }
//! ```
//!
//! [`load_handle`] is the startup entry point. It never fails; a bad artifact
//! yields an unloaded [`ModelHandle`] so the server can still report health.

mod linear;
mod tree;

pub use linear::LinearModel;
pub use tree::{DecisionTree, Leaf, RandomForest, Split, TreeNode};

use std::fs;
use std::path::Path;

use iris_core::{Classifier, FeatureVector, InferenceError, ModelHandle};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    Invalid(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Artifact
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    Linear(LinearModel),
}

impl ModelArtifact {
    /// Reads and validates an artifact file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses and validates an artifact from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::DecisionTree(_) => "decision_tree",
            ModelArtifact::RandomForest(_) => "random_forest",
            ModelArtifact::Linear(_) => "linear",
        }
    }

    /// Structural checks. Leaf class indices are left to the prediction service.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::DecisionTree(m) => m.validate(),
            ModelArtifact::RandomForest(m) => m.validate(),
            ModelArtifact::Linear(m) => m.validate(),
        }
    }
}

impl Classifier for ModelArtifact {
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        match self {
            ModelArtifact::DecisionTree(m) => m.predict(batch),
            ModelArtifact::RandomForest(m) => m.predict(batch),
            ModelArtifact::Linear(m) => m.predict(batch),
        }
    }
}

/// Loads the artifact at `path` into a model handle, logging the outcome.
pub fn load_handle(path: impl AsRef<Path>) -> ModelHandle {
    let path = path.as_ref();
    match ModelArtifact::from_path(path) {
        Ok(artifact) => {
            info!(path = %path.display(), kind = artifact.kind(), "Model loaded successfully");
            ModelHandle::ready(artifact)
        }
        Err(e) => {
            error!(path = %path.display(), "Error loading model: {}", e);
            ModelHandle::unloaded(e.to_string())
        }
    }
}
