//! Linear classifier scored one-vs-rest.

use iris_core::{FeatureVector, InferenceError, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// One weight row and intercept per class. Predicts the class with the
/// highest `w·x + b`, first maximum on ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearModel {
    pub fn new(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Self {
        Self { coefficients, intercepts }
    }

    /// Raw per-class scores for one sample.
    pub fn decision_function(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        if self.intercepts.len() != self.coefficients.len() {
            return Err(InferenceError::new(format!(
                "model has {} coefficient rows but {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }

        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                if row.len() != FEATURE_COUNT {
                    return Err(InferenceError::new(format!(
                        "X has {} features, but the model expects {}",
                        FEATURE_COUNT,
                        row.len()
                    )));
                }
                let dot: f64 = row.iter().zip(x.values()).map(|(w, v)| w * v).sum();
                Ok(dot + intercept)
            })
            .collect()
    }

    pub fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
        batch
            .iter()
            .map(|x| {
                let scores = self.decision_function(x)?;
                argmax(&scores)
                    .map(|class| class as f64)
                    .ok_or_else(|| InferenceError::new("linear model has no classes"))
            })
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.is_empty() {
            return Err(ModelError::Invalid("linear model has no classes".into()));
        }
        if self.intercepts.len() != self.coefficients.len() {
            return Err(ModelError::Invalid(format!(
                "expected {} intercepts, found {}",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        for (class, row) in self.coefficients.iter().enumerate() {
            if row.len() != FEATURE_COUNT {
                return Err(ModelError::Invalid(format!(
                    "coefficient row {} has {} weights (expected {})",
                    class,
                    row.len(),
                    FEATURE_COUNT
                )));
            }
        }
        let all_finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|w| w.is_finite());
        if !all_finite {
            return Err(ModelError::Invalid("linear model has non-finite weights".into()));
        }
        Ok(())
    }
}

fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn petal_model() -> LinearModel {
        // Scores driven by petal length only
        LinearModel::new(
            vec![
                vec![0.0, 0.0, -1.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            vec![2.5, 0.0, -5.0],
        )
    }

    #[test]
    fn test_argmax_picks_highest_score() {
        let model = petal_model();
        let batch = [
            FeatureVector::new([5.1, 3.5, 1.4, 0.2]),
            FeatureVector::new([6.0, 2.9, 4.5, 1.5]),
            FeatureVector::new([6.5, 3.0, 5.8, 2.2]),
        ];
        assert_eq!(model.predict(&batch).unwrap(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_decision_function() {
        let model = petal_model();
        let scores = model.decision_function(&FeatureVector::new([0.0, 0.0, 2.0, 0.0])).unwrap();
        assert_eq!(scores, vec![0.5, 0.0, -3.0]);
    }

    #[test]
    fn test_ties_pick_first_class() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_validate_shapes() {
        assert!(petal_model().validate().is_ok());

        let short_row = LinearModel::new(vec![vec![1.0, 2.0]], vec![0.0]);
        assert!(short_row.validate().is_err());

        let missing_intercept = LinearModel::new(vec![vec![1.0; 4], vec![1.0; 4]], vec![0.0]);
        assert!(missing_intercept.validate().is_err());

        let empty = LinearModel::new(vec![], vec![]);
        assert!(empty.validate().is_err());

        let infinite = LinearModel::new(vec![vec![f64::INFINITY, 0.0, 0.0, 0.0]], vec![0.0]);
        assert!(infinite.validate().is_err());
    }

    #[test]
    fn test_predict_on_unvalidated_shape_errors() {
        let model = LinearModel::new(vec![vec![1.0, 2.0]], vec![0.0]);
        let err = model.predict(&[FeatureVector::new([1.0; 4])]).unwrap_err();
        assert_eq!(err.to_string(), "X has 4 features, but the model expects 2");
    }
}
