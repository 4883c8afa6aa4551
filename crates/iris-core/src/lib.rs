//! Core domain types and error definitions for iris-serve.
//!
//! This crate holds everything the prediction path needs independent of HTTP:
//!
//! - [`FeatureInput`] and [`FeatureVector`]: the request features and their fixed model order
//! - [`ClassLabel`] and [`PredictionResult`]: what a prediction produces
//! - [`PredictionError`]: the closed set of ways a prediction can fail
//! - [`Classifier`] and [`ModelHandle`]: the loaded model and its lifecycle
//! - [`PredictionService`]: the request lifecycle tying them together
//!
//! # Example
//!
//! ```rust
//! use iris_core::{Classifier, FeatureInput, FeatureVector, InferenceError, ModelHandle, PredictionService};
//!
//! struct AlwaysSetosa;
//!
//! impl Classifier for AlwaysSetosa {
//!     fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
//!         Ok(vec![0.0; batch.len()])
//!     }
//! }
//!
//! let service = PredictionService::new(ModelHandle::ready(AlwaysSetosa));
//! let input = FeatureInput::new(5.1, 3.5, 1.4, 0.2);
//! let result = service.predict(&input).unwrap();
//! assert_eq!(result.predicted_class.as_str(), "setosa");
//! ```

mod service;

pub use service::PredictionService;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

/// Ways a single prediction can fail once the request has passed validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// The model handle never finished loading.
    #[error("Model not loaded or is unavailable")]
    ModelUnavailable,

    /// The model produced a class index with no label.
    #[error("predicted index {0} is outside the label range [0, {max}]", max = ClassLabel::ALL.len() - 1)]
    InvalidPrediction(f64),

    /// Vector construction or inference failed.
    #[error("{0}")]
    InferenceFailure(String),
}

/// Error returned by a [`Classifier`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InferenceError(pub String);

impl InferenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<InferenceError> for PredictionError {
    fn from(err: InferenceError) -> Self {
        PredictionError::InferenceFailure(err.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Features
// ─────────────────────────────────────────────────────────────────────────────

/// Number of features the model consumes.
pub const FEATURE_COUNT: usize = 4;

/// Feature names in the column order the model was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Flower measurements as submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureInput {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl FeatureInput {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self { sepal_length, sepal_width, petal_length, petal_width }
    }
}

/// Model input in training column order. See [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.0.get(idx).copied()
    }

    /// Returns the name of the first non-finite feature, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.0
            .iter()
            .position(|v| !v.is_finite())
            .map(|idx| FEATURE_NAMES[idx])
    }
}

impl From<&FeatureInput> for FeatureVector {
    // Must stay in sync with FEATURE_NAMES.
    fn from(input: &FeatureInput) -> Self {
        Self([
            input.sepal_length,
            input.sepal_width,
            input.petal_length,
            input.petal_width,
        ])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Labels
// ─────────────────────────────────────────────────────────────────────────────

/// Iris species, in the label encoding used at training time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassLabel {
    Setosa,
    Versicolor,
    Virginica,
}

impl ClassLabel {
    /// All labels, positioned by class index.
    pub const ALL: [ClassLabel; 3] = [ClassLabel::Setosa, ClassLabel::Versicolor, ClassLabel::Virginica];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            ClassLabel::Setosa => 0,
            ClassLabel::Versicolor => 1,
            ClassLabel::Virginica => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Setosa => "setosa",
            ClassLabel::Versicolor => "versicolor",
            ClassLabel::Virginica => "virginica",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_class: ClassLabel,
    pub predicted_index: usize,
}

impl From<ClassLabel> for PredictionResult {
    fn from(label: ClassLabel) -> Self {
        Self { predicted_class: label, predicted_index: label.index() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────────────────────────────────────

/// A trained model that maps feature vectors to class indices.
///
/// Implementations return one value per input row. Values are class indices
/// encoded as floats; callers truncate them.
pub trait Classifier: Send + Sync {
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, InferenceError>;
}

/// The process-wide model, or the reason it is missing.
///
/// Decided once at startup and never changed afterwards.
#[derive(Clone)]
pub enum ModelHandle {
    Unloaded { reason: String },
    Ready(Arc<dyn Classifier>),
}

impl ModelHandle {
    pub fn ready(classifier: impl Classifier + 'static) -> Self {
        ModelHandle::Ready(Arc::new(classifier))
    }

    pub fn unloaded(reason: impl Into<String>) -> Self {
        ModelHandle::Unloaded { reason: reason.into() }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelHandle::Ready(_))
    }

    pub fn classifier(&self) -> Option<&dyn Classifier> {
        match self {
            ModelHandle::Ready(classifier) => Some(classifier.as_ref()),
            ModelHandle::Unloaded { .. } => None,
        }
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelHandle::Unloaded { reason } => {
                f.debug_struct("Unloaded").field("reason", reason).finish()
            }
            ModelHandle::Ready(_) => f.write_str("Ready"),
        }
    }
}
