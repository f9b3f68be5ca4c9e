//! Configuration types for the classifier backends.

pub mod onnx;

pub use onnx::{OrtExecutionProvider, OrtSessionConfig};
