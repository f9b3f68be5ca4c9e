//! Interpretation of raw classifier outputs.
//!
//! Classifiers for this task come in two flavours: a single sigmoid unit
//! giving P(Malignant), or a softmax score vector whose index 0 is Benign and
//! index 1 is Malignant. [`PredictionScores::from_raw`] decides once which of
//! the two a raw output is, and [`PredictionScores::decide`] turns it into a
//! label and confidence.

use crate::core::{LesionError, LesionResult, RawPrediction, SIGMOID_THRESHOLD, TensorOutput};
use crate::domain::result::{ClassificationResult, Label};

/// Class scores in one of the two supported conventions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionScores {
    /// Single sigmoid output: probability of malignancy.
    Sigmoid(f32),
    /// Two-way softmax output.
    TwoClass {
        /// Probability of the benign class (index 0).
        benign: f32,
        /// Probability of the malignant class (index 1).
        malignant: f32,
    },
    /// Score vector with more than two entries. Only the first maximal entry
    /// is kept; it counts as malignant only when it sits at index 1.
    MultiClass { best_index: usize, best_score: f32 },
}

impl PredictionScores {
    /// Classifies a raw prediction into one of the supported conventions.
    ///
    /// Only the first classifier output is looked at; any further outputs
    /// (such as an activation map) are ignored here.
    ///
    /// # Errors
    ///
    /// Returns [`LesionError::PredictionShape`] when there is no output, the
    /// first output is empty, has more than one non-singleton dimension, or
    /// contains NaN or infinite values.
    pub fn from_raw(raw: &RawPrediction) -> LesionResult<Self> {
        let output = raw
            .primary()
            .ok_or_else(|| LesionError::prediction_shape("classifier returned no outputs"))?;
        Self::from_tensor(output)
    }

    /// Classifies a single output tensor.
    pub fn from_tensor(output: &TensorOutput) -> LesionResult<Self> {
        if output.is_empty() {
            return Err(LesionError::prediction_shape(format!(
                "output with shape {:?} holds no values",
                output.shape()
            )));
        }

        let squeezed = output.squeezed_shape();
        if squeezed.len() > 1 {
            return Err(LesionError::prediction_shape(format!(
                "expected a scalar or a score vector, got shape {:?}",
                output.shape()
            )));
        }

        if let Some((idx, value)) = output
            .data()
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(LesionError::prediction_shape(format!(
                "score at index {idx} is not finite: {value}"
            )));
        }

        match output.data() {
            [value] => Ok(Self::Sigmoid(*value)),
            [benign, malignant] => Ok(Self::TwoClass {
                benign: *benign,
                malignant: *malignant,
            }),
            [first, rest @ ..] => {
                let (best_index, best_score) = rest
                    .iter()
                    .enumerate()
                    .fold((0, *first), |best, (idx, &score)| {
                        if score > best.1 {
                            (idx + 1, score)
                        } else {
                            best
                        }
                    });
                Ok(Self::MultiClass {
                    best_index,
                    best_score,
                })
            }
            [] => Err(LesionError::prediction_shape("output holds no values")),
        }
    }

    /// Chooses the label and the probability mass backing it.
    ///
    /// A sigmoid score of exactly 0.5 is benign, and so is a softmax tie. The
    /// benign complement of a sigmoid score is taken in double precision.
    pub fn decide(&self) -> (Label, f64) {
        match *self {
            Self::Sigmoid(value) => {
                if value > SIGMOID_THRESHOLD {
                    (Label::Malignant, f64::from(value))
                } else {
                    (Label::Benign, 1.0 - f64::from(value))
                }
            }
            Self::TwoClass { benign, malignant } => {
                let (index, score) = if malignant > benign {
                    (1, malignant)
                } else {
                    (0, benign)
                };
                (Label::from_class_index(index), f64::from(score))
            }
            Self::MultiClass {
                best_index,
                best_score,
            } => (Label::from_class_index(best_index), f64::from(best_score)),
        }
    }
}

/// Turns a raw classifier prediction into the canonical result.
pub fn interpret(raw: &RawPrediction) -> LesionResult<ClassificationResult> {
    let scores = PredictionScores::from_raw(raw)?;
    let (label, confidence) = scores.decide();
    Ok(ClassificationResult::new(label, confidence))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigmoid(value: f32) -> RawPrediction {
        TensorOutput::new(vec![1, 1], vec![value]).unwrap().into()
    }

    fn softmax(benign: f32, malignant: f32) -> RawPrediction {
        TensorOutput::new(vec![1, 2], vec![benign, malignant])
            .unwrap()
            .into()
    }

    #[test]
    fn test_sigmoid_above_threshold_is_malignant() {
        let result = interpret(&sigmoid(0.51)).unwrap();
        assert_eq!(result.label, Label::Malignant);
        assert_eq!(result.confidence, "51.0%");
    }

    #[test]
    fn test_sigmoid_below_threshold_is_benign_with_complement() {
        let result = interpret(&sigmoid(0.49)).unwrap();
        assert_eq!(result.label, Label::Benign);
        assert_eq!(result.confidence, "51.0%");
        assert_eq!(result.prediction_score, "51.0");
    }

    #[test]
    fn test_sigmoid_tie_is_benign() {
        let result = interpret(&sigmoid(0.5)).unwrap();
        assert_eq!(result.label, Label::Benign);
        assert_eq!(result.confidence_value, 0.5);
        assert_eq!(result.confidence, "50.0%");
    }

    #[test]
    fn test_scalar_shapes() {
        for raw in [
            RawPrediction::single(TensorOutput::scalar(0.9)),
            RawPrediction::single(TensorOutput::vector(vec![0.9])),
            TensorOutput::new(vec![1, 1, 1], vec![0.9]).unwrap().into(),
        ] {
            assert_eq!(
                PredictionScores::from_raw(&raw).unwrap(),
                PredictionScores::Sigmoid(0.9)
            );
        }
    }

    #[test]
    fn test_softmax_argmax() {
        let result = interpret(&softmax(0.2, 0.8)).unwrap();
        assert_eq!(result.label, Label::Malignant);
        assert_eq!(result.confidence, "80.0%");

        let result = interpret(&softmax(0.9, 0.1)).unwrap();
        assert_eq!(result.label, Label::Benign);
        assert_eq!(result.confidence, "90.0%");
    }

    #[test]
    fn test_sigmoid_complement_in_double_precision() {
        let result = interpret(&sigmoid(0.000_499_993_6)).unwrap();
        assert_eq!(result.label, Label::Benign);
        assert_eq!(result.confidence, "100.0%");
        assert_eq!(result.prediction_score, "100.0");
    }

    #[test]
    fn test_longer_score_vectors_use_argmax() {
        let result = interpret(&TensorOutput::vector(vec![0.1, 0.2, 0.7]).into()).unwrap();
        assert_eq!(result.label, Label::Benign);
        assert_eq!(result.confidence, "70.0%");

        let raw: RawPrediction = TensorOutput::new(vec![1, 3], vec![0.1, 0.6, 0.3])
            .unwrap()
            .into();
        let result = interpret(&raw).unwrap();
        assert_eq!(result.label, Label::Malignant);
        assert_eq!(result.confidence, "60.0%");

        let raw: RawPrediction = TensorOutput::vector(vec![0.2, 0.4, 0.4]).into();
        assert_eq!(
            PredictionScores::from_raw(&raw).unwrap(),
            PredictionScores::MultiClass {
                best_index: 1,
                best_score: 0.4
            }
        );
        assert_eq!(interpret(&raw).unwrap().label, Label::Malignant);

        let result = interpret(&TensorOutput::vector(vec![0.4, 0.4, 0.2]).into()).unwrap();
        assert_eq!(result.label, Label::Benign);
        assert_eq!(result.confidence, "40.0%");
    }

    #[test]
    fn test_softmax_tie_is_benign() {
        let result = interpret(&softmax(0.5, 0.5)).unwrap();
        assert_eq!(result.label, Label::Benign);
        assert_eq!(result.confidence, "50.0%");
    }

    #[test]
    fn test_only_first_output_used() {
        let raw = RawPrediction::new(vec![
            TensorOutput::new(vec![1, 2], vec![0.3, 0.7]).unwrap(),
            TensorOutput::new(vec![1, 4, 4, 1], vec![f32::NAN; 16]).unwrap(),
        ]);
        let result = interpret(&raw).unwrap();
        assert_eq!(result.label, Label::Malignant);
        assert_eq!(result.confidence, "70.0%");
    }

    #[test]
    fn test_invalid_outputs_are_shape_errors() {
        let cases = [
            RawPrediction::new(vec![]),
            TensorOutput::new(vec![1, 0], vec![]).unwrap().into(),
            TensorOutput::new(vec![2, 2], vec![0.1, 0.9, 0.2, 0.8])
                .unwrap()
                .into(),
            sigmoid(f32::NAN),
            softmax(f32::INFINITY, 0.1),
        ];
        for raw in cases {
            let err = interpret(&raw).unwrap_err();
            assert!(
                matches!(err, LesionError::PredictionShape { .. }),
                "unexpected error for {raw:?}: {err}"
            );
        }
    }

    #[test]
    fn test_interpret_is_deterministic() {
        for raw in [sigmoid(0.73), softmax(0.41, 0.59)] {
            let first = interpret(&raw).unwrap();
            let second = interpret(&raw).unwrap();
            assert_eq!(first, second);
            assert_eq!(
                first.confidence_value.to_bits(),
                second.confidence_value.to_bits()
            );
        }
    }
}
