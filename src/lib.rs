//! # lesion-classifier
//!
//! Classifies skin-lesion photographs as **Benign** or **Malignant** with a
//! pretrained image classifier and reports how confident the model is in the
//! chosen label.
//!
//! The request pipeline has three steps:
//!
//! 1. [`NormalizeImage`](processors::NormalizeImage) decodes the upload and
//!    produces a `(1, 384, 384, 3)` RGB tensor scaled to `[0, 1]`.
//! 2. A [`Classifier`](core::Classifier) runs the model. The ONNX Runtime
//!    backend is [`OrtClassifier`](core::OrtClassifier); tests substitute
//!    their own implementation.
//! 3. [`interpret`](domain::interpret) maps the raw output, sigmoid or
//!    two-way softmax, to a [`ClassificationResult`](domain::ClassificationResult).
//!
//! ```rust,no_run
//! use lesion_classifier::predictors::LesionPredictor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let predictor = LesionPredictor::builder().build("models/skin_lesion_resnet_cam.onnx")?;
//! let result = predictor.predict_path("lesion.jpg")?;
//! println!("{} ({})", result.label, result.confidence);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod predictors;
pub mod processors;
pub mod utils;

pub use crate::core::{Classifier, LesionError, RawPrediction, TensorOutput};
pub use crate::domain::{ClassificationResult, Label, SourceImage, interpret};
pub use crate::predictors::LesionPredictor;
