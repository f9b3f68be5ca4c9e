//! Skin Lesion Predictor
//!
//! This module provides the request pipeline: normalize the uploaded image,
//! run the classifier, interpret its output.

use crate::core::{Classifier, LesionResult, OrtClassifier, OrtSessionConfig};
use crate::domain::{ClassificationResult, SourceImage, interpret};
use crate::processors::{NormalizeImage, NormalizerConfig, ResizeFilter};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Classifies skin-lesion images as benign or malignant.
///
/// The predictor holds no per-request state. Clone it or share it behind an
/// `Arc`; every clone uses the same classifier handle.
#[derive(Clone)]
pub struct LesionPredictor {
    classifier: Arc<dyn Classifier>,
    normalizer: NormalizeImage,
}

impl std::fmt::Debug for LesionPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LesionPredictor")
            .field("classifier", &self.classifier.name())
            .field("normalizer", &self.normalizer)
            .finish()
    }
}

impl LesionPredictor {
    /// Create a new builder for the lesion predictor
    pub fn builder() -> LesionPredictorBuilder {
        LesionPredictorBuilder::new()
    }

    /// Creates a predictor with the default normalizer.
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            normalizer: NormalizeImage::default(),
        }
    }

    /// The classifier backing this predictor.
    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    /// Classifies a validated upload.
    pub fn predict(&self, source: &SourceImage) -> LesionResult<ClassificationResult> {
        let tensor = self.normalizer.normalize(source)?;
        let raw = self.classifier.classify(&tensor)?;

        if !raw.auxiliary().is_empty() {
            debug!(
                model = self.classifier.name(),
                ignored = raw.auxiliary().len(),
                "ignoring auxiliary classifier outputs"
            );
        }

        let result = interpret(&raw)?;
        debug!(label = %result.label, confidence = result.confidence_value, "prediction interpreted");

        Ok(result)
    }

    /// Reads, validates and classifies an image file.
    pub fn predict_path(&self, path: impl AsRef<Path>) -> LesionResult<ClassificationResult> {
        let source = SourceImage::from_path(path)?;
        self.predict(&source)
    }
}

/// Builder for lesion predictor
#[derive(Debug, Default)]
pub struct LesionPredictorBuilder {
    normalizer_config: NormalizerConfig,
    ort_config: Option<OrtSessionConfig>,
}

impl LesionPredictorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_shape(mut self, shape: (u32, u32)) -> Self {
        self.normalizer_config.input_shape = shape;
        self
    }

    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.normalizer_config.resize_filter = filter;
        self
    }

    pub fn normalizer_config(mut self, config: NormalizerConfig) -> Self {
        self.normalizer_config = config;
        self
    }

    /// Sets the ONNX Runtime session configuration used by [`build`](Self::build).
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_config = Some(config);
        self
    }

    /// Builds a predictor around an ONNX model file.
    pub fn build<P: AsRef<Path>>(self, model_path: P) -> LesionResult<LesionPredictor> {
        let mut classifier_builder = OrtClassifier::builder();
        if let Some(ort_config) = self.ort_config.clone() {
            classifier_builder = classifier_builder.with_ort_config(ort_config);
        }
        let classifier = classifier_builder.build(model_path)?;
        self.build_with_classifier(Arc::new(classifier))
    }

    /// Builds a predictor around an existing classifier handle.
    pub fn build_with_classifier(
        self,
        classifier: Arc<dyn Classifier>,
    ) -> LesionResult<LesionPredictor> {
        Ok(LesionPredictor {
            classifier,
            normalizer: NormalizeImage::new(self.normalizer_config)?,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeClassifier, png_bytes};
    use super::*;
    use crate::core::{LesionError, RawPrediction, TensorOutput, ValidationError};
    use crate::domain::Label;

    fn predictor(response: RawPrediction) -> (LesionPredictor, Arc<FakeClassifier>) {
        let fake = Arc::new(FakeClassifier::new(response));
        (LesionPredictor::new(fake.clone()), fake)
    }

    #[test]
    fn test_end_to_end_with_fake_classifier() {
        let (predictor, fake) = predictor(TensorOutput::vector(vec![0.2, 0.8]).into());
        let source = SourceImage::new("lesion.png", png_bytes(600, 450)).unwrap();

        let result = predictor.predict(&source).unwrap();
        assert_eq!(result.label, Label::Malignant);
        assert_eq!(result.confidence, "80.0%");
        assert_eq!(fake.calls(), 1);
        assert_eq!(
            fake.last_shape.lock().unwrap().as_deref(),
            Some(&[1, 384, 384, 3][..])
        );
    }

    #[test]
    fn test_predict_agrees_with_interpret() {
        for response in [
            RawPrediction::from(TensorOutput::scalar(0.000_499_993_6)),
            TensorOutput::vector(vec![0.1, 0.2, 0.7]).into(),
            TensorOutput::vector(vec![0.25, 0.6, 0.15]).into(),
        ] {
            let expected = crate::domain::interpret(&response).unwrap();
            let (predictor, _) = predictor(response);
            let source = SourceImage::new("lesion.png", png_bytes(20, 20)).unwrap();
            assert_eq!(predictor.predict(&source).unwrap(), expected);
        }
    }

    #[test]
    fn test_multi_output_classifier() {
        let (predictor, _) = predictor(RawPrediction::new(vec![
            TensorOutput::vector(vec![0.3, 0.7]),
            TensorOutput::new(vec![1, 12, 12, 1], vec![0.0; 144]).unwrap(),
        ]));
        let source = SourceImage::new("lesion.jpeg", png_bytes(32, 32)).unwrap();

        let result = predictor.predict(&source).unwrap();
        assert_eq!(result.label, Label::Malignant);
        assert_eq!(result.confidence, "70.0%");
    }

    #[test]
    fn test_disallowed_extension_never_reaches_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("malware.exe");
        std::fs::write(&path, png_bytes(8, 8)).unwrap();

        let (predictor, fake) = predictor(TensorOutput::scalar(0.9).into());
        let err = predictor.predict_path(&path).unwrap_err();
        assert!(matches!(
            err,
            LesionError::Validation(ValidationError::DisallowedExtension { .. })
        ));
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_corrupt_upload_is_decode_error_without_inference() {
        let (predictor, fake) = predictor(TensorOutput::scalar(0.9).into());
        let source = SourceImage::new("x.png", Vec::new()).unwrap();

        let err = predictor.predict(&source).unwrap_err();
        assert!(matches!(err, LesionError::Decode { .. }));
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_bad_classifier_output_is_shape_error() {
        let (predictor, _) = predictor(RawPrediction::new(vec![]));
        let source = SourceImage::new("lesion.png", png_bytes(16, 16)).unwrap();

        let err = predictor.predict(&source).unwrap_err();
        assert!(matches!(err, LesionError::PredictionShape { .. }));
    }

    #[test]
    fn test_builder_applies_input_shape() {
        let fake = Arc::new(FakeClassifier::new(TensorOutput::scalar(0.1).into()));
        let predictor = LesionPredictor::builder()
            .input_shape((224, 224))
            .resize_filter(ResizeFilter::Nearest)
            .build_with_classifier(fake.clone())
            .unwrap();
        let source = SourceImage::new("lesion.bmp", png_bytes(16, 16)).unwrap();

        let result = predictor.predict(&source).unwrap();
        assert_eq!(result.label, Label::Benign);
        assert_eq!(result.confidence, "90.0%");
        assert_eq!(
            fake.last_shape.lock().unwrap().as_deref(),
            Some(&[1, 224, 224, 3][..])
        );
    }

    #[test]
    fn test_builder_rejects_invalid_normalizer() {
        let fake = Arc::new(FakeClassifier::new(TensorOutput::scalar(0.1).into()));
        assert!(LesionPredictor::builder()
            .input_shape((0, 0))
            .build_with_classifier(fake)
            .is_err());
    }
}
