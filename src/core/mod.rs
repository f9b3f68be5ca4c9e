//! The core module of the classification pipeline.
//!
//! This module contains the pieces every other part of the crate builds on:
//! - Error types and the client/server error split
//! - ONNX Runtime configuration
//! - The classifier abstraction and its ONNX Runtime implementation
//! - Pipeline constants

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;

pub use config::{OrtExecutionProvider, OrtSessionConfig};
pub use constants::*;
pub use errors::{ErrorKind, LesionError, LesionResult, ValidationError};
pub use inference::{
    Classifier, OrtClassifier, OrtClassifierBuilder, RawPrediction, Tensor4D, TensorOutput,
};
