//! Prediction request lifecycle.

use tracing::{debug, warn};

use crate::{ClassLabel, FeatureInput, FeatureVector, ModelHandle, PredictionError, PredictionResult};

/// Turns validated feature input into a labelled prediction.
///
/// Holds no per-request state; the handle is shared read-only, so one service
/// can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct PredictionService {
    model: ModelHandle,
}

impl PredictionService {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_ready()
    }

    /// Runs a single prediction.
    ///
    /// Fails with [`PredictionError::ModelUnavailable`] before touching the
    /// classifier when the handle is unloaded.
    pub fn predict(&self, input: &FeatureInput) -> Result<PredictionResult, PredictionError> {
        let classifier = self.model.classifier().ok_or(PredictionError::ModelUnavailable)?;

        let vector = FeatureVector::from(input);
        if let Some(name) = vector.first_non_finite() {
            return Err(PredictionError::InferenceFailure(format!(
                "feature {} must be a finite number",
                name
            )));
        }
        debug!(features = ?vector.values(), "Running inference");

        let predictions = classifier.predict(std::slice::from_ref(&vector))?;
        let raw = predictions.first().copied().ok_or_else(|| {
            PredictionError::InferenceFailure("model returned no predictions".into())
        })?;

        let label = label_for(raw).ok_or_else(|| {
            warn!(raw, "Model produced an out-of-range class index");
            PredictionError::InvalidPrediction(raw)
        })?;

        Ok(PredictionResult::from(label))
    }
}

/// Truncates a raw model output toward zero and looks up its label.
fn label_for(raw: f64) -> Option<ClassLabel> {
    if !raw.is_finite() {
        return None;
    }
    let index = raw.trunc();
    if index < 0.0 {
        return None;
    }
    ClassLabel::from_index(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classifier, InferenceError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns a fixed output and counts how often it was asked.
    struct Fixed {
        output: Vec<f64>,
        calls: Arc<AtomicUsize>,
    }

    impl Fixed {
        fn new(output: Vec<f64>) -> Self {
            Self { output, calls: Arc::new(AtomicUsize::new(0)) }
        }
    }

    impl Classifier for Fixed {
        fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
            assert_eq!(batch.len(), 1);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn predict(&self, _batch: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
            Err(InferenceError::new("shape mismatch"))
        }
    }

    /// Setosa whenever petal length is short, virginica otherwise.
    struct PetalRule;

    impl Classifier for PetalRule {
        fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, InferenceError> {
            Ok(batch
                .iter()
                .map(|v| if v.values()[2] <= 2.45 { 0.0 } else { 2.0 })
                .collect())
        }
    }

    fn sample() -> FeatureInput {
        FeatureInput::new(5.1, 3.5, 1.4, 0.2)
    }

    #[test]
    fn test_setosa_exemplar() {
        let service = PredictionService::new(ModelHandle::ready(PetalRule));
        let result = service.predict(&sample()).unwrap();
        assert_eq!(result.predicted_index, 0);
        assert_eq!(result.predicted_class, ClassLabel::Setosa);
    }

    #[test]
    fn test_unloaded_returns_model_unavailable() {
        let service = PredictionService::new(ModelHandle::unloaded("no artifact"));
        assert!(!service.is_ready());

        for _ in 0..3 {
            assert_eq!(service.predict(&sample()), Err(PredictionError::ModelUnavailable));
        }
    }

    #[test]
    fn test_ready_invokes_classifier_once_per_request() {
        let fixed = Fixed::new(vec![1.0]);
        let calls = fixed.calls.clone();
        let service = PredictionService::new(ModelHandle::ready(fixed));

        service.predict(&sample()).unwrap();
        service.predict(&sample()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_out_of_range_index() {
        let service = PredictionService::new(ModelHandle::ready(Fixed::new(vec![7.0])));
        assert_eq!(service.predict(&sample()), Err(PredictionError::InvalidPrediction(7.0)));
    }

    #[test]
    fn test_negative_and_non_finite_indices() {
        for raw in [-1.0, f64::NAN, f64::INFINITY, 3.0] {
            let service = PredictionService::new(ModelHandle::ready(Fixed::new(vec![raw])));
            assert!(matches!(
                service.predict(&sample()),
                Err(PredictionError::InvalidPrediction(_))
            ));
        }
    }

    #[test]
    fn test_fractional_index_truncates() {
        let service = PredictionService::new(ModelHandle::ready(Fixed::new(vec![1.9])));
        let result = service.predict(&sample()).unwrap();
        assert_eq!(result.predicted_index, 1);
        assert_eq!(result.predicted_class, ClassLabel::Versicolor);

        // -0.5 truncates to zero, same as int() on the model output
        let service = PredictionService::new(ModelHandle::ready(Fixed::new(vec![-0.5])));
        assert_eq!(service.predict(&sample()).unwrap().predicted_index, 0);
    }

    #[test]
    fn test_only_first_prediction_is_used() {
        let service = PredictionService::new(ModelHandle::ready(Fixed::new(vec![2.0, 0.0])));
        assert_eq!(service.predict(&sample()).unwrap().predicted_class, ClassLabel::Virginica);
    }

    #[test]
    fn test_empty_output_is_inference_failure() {
        let service = PredictionService::new(ModelHandle::ready(Fixed::new(vec![])));
        assert_eq!(
            service.predict(&sample()),
            Err(PredictionError::InferenceFailure("model returned no predictions".into()))
        );
    }

    #[test]
    fn test_classifier_error_preserves_message() {
        let service = PredictionService::new(ModelHandle::ready(Failing));
        assert_eq!(
            service.predict(&sample()),
            Err(PredictionError::InferenceFailure("shape mismatch".into()))
        );
        // a failed call leaves the service usable
        assert!(service.is_ready());
    }

    #[test]
    fn test_non_finite_feature_rejected() {
        let service = PredictionService::new(ModelHandle::ready(PetalRule));
        let input = FeatureInput { petal_width: f64::NAN, ..sample() };
        assert_eq!(
            service.predict(&input),
            Err(PredictionError::InferenceFailure("feature petal_width must be a finite number".into()))
        );
    }

    #[test]
    fn test_valid_inputs_map_to_known_labels() {
        let service = PredictionService::new(ModelHandle::ready(PetalRule));
        for petal_length in [0.0, 1.0, 2.45, 2.46, 5.0, 1e9, -1e9] {
            let input = FeatureInput { petal_length, ..sample() };
            let result = service.predict(&input).unwrap();
            assert!(result.predicted_index <= 2);
            assert_eq!(ClassLabel::from_index(result.predicted_index), Some(result.predicted_class));
        }
    }
}
