//! Classifier abstraction and raw inference outputs.
//!
//! The classifier is consumed as an opaque function: a normalized image tensor
//! goes in, an ordered list of output tensors comes out. Nothing here assigns
//! meaning to those outputs; that is the job of
//! [`PredictionScores`](crate::domain::PredictionScores).

mod ort_classifier;

pub use ort_classifier::{OrtClassifier, OrtClassifierBuilder};

use crate::core::LesionError;
use ndarray::Array4;

/// Normalized image batch in NHWC layout.
pub type Tensor4D = Array4<f32>;

/// A single floating point output tensor as returned by a classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorOutput {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl TensorOutput {
    /// Creates a tensor, checking that `data` matches `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, LesionError> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(LesionError::prediction_shape(format!(
                "data length mismatch: shape {:?} needs {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Creates a 0-dimensional tensor holding one value.
    pub fn scalar(value: f32) -> Self {
        Self {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    /// Creates a 1-dimensional tensor from a vector.
    pub fn vector(values: Vec<f32>) -> Self {
        Self {
            shape: vec![values.len()],
            data: values,
        }
    }

    /// Returns the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the flattened data in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the shape with every size-1 dimension removed.
    pub fn squeezed_shape(&self) -> Vec<usize> {
        self.shape.iter().copied().filter(|&d| d != 1).collect()
    }

    /// Returns true if the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Everything a classifier returned for one image, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    outputs: Vec<TensorOutput>,
}

impl RawPrediction {
    /// Wraps the outputs of a multi-output classifier.
    pub fn new(outputs: Vec<TensorOutput>) -> Self {
        Self { outputs }
    }

    /// Wraps the output of a single-output classifier.
    pub fn single(output: TensorOutput) -> Self {
        Self {
            outputs: vec![output],
        }
    }

    /// The output used for classification.
    pub fn primary(&self) -> Option<&TensorOutput> {
        self.outputs.first()
    }

    /// Outputs after the first one (e.g. an activation map); not used for labelling.
    pub fn auxiliary(&self) -> &[TensorOutput] {
        self.outputs.get(1..).unwrap_or(&[])
    }
}

impl From<TensorOutput> for RawPrediction {
    fn from(output: TensorOutput) -> Self {
        Self::single(output)
    }
}

/// A pretrained image classifier.
///
/// Implementations must be safe to call concurrently; the handle is built once
/// at startup and shared read-only between requests.
pub trait Classifier: Send + Sync {
    /// Human-readable model name used in logs and errors.
    fn name(&self) -> &str;

    /// Runs the model on a `(1, H, W, 3)` tensor.
    fn classify(&self, tensor: &Tensor4D) -> Result<RawPrediction, LesionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_output_length_checked() {
        assert!(TensorOutput::new(vec![1, 2], vec![0.1, 0.9]).is_ok());
        assert!(TensorOutput::new(vec![1, 2], vec![0.1]).is_err());
    }

    #[test]
    fn test_squeezed_shape() {
        let t = TensorOutput::new(vec![1, 1], vec![0.3]).unwrap();
        assert!(t.squeezed_shape().is_empty());

        let t = TensorOutput::new(vec![1, 2], vec![0.3, 0.7]).unwrap();
        assert_eq!(t.squeezed_shape(), vec![2]);

        assert!(TensorOutput::scalar(0.5).squeezed_shape().is_empty());
    }

    #[test]
    fn test_raw_prediction_primary_and_auxiliary() {
        let raw = RawPrediction::new(vec![
            TensorOutput::vector(vec![0.3, 0.7]),
            TensorOutput::vector(vec![0.0; 16]),
        ]);
        assert_eq!(raw.primary().unwrap().data(), &[0.3, 0.7]);
        assert_eq!(raw.auxiliary().len(), 1);

        let empty = RawPrediction::new(vec![]);
        assert!(empty.primary().is_none());
        assert!(empty.auxiliary().is_empty());
    }
}
