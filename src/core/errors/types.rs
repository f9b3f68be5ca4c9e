//! Core error types for the classification pipeline.
//!
//! This module defines the error taxonomy shared by the image normalizer, the
//! prediction interpreter and the classifier backends. The boundary layer maps
//! [`ErrorKind`] to a response class; nothing in the core decides status codes.

use thiserror::Error;

/// Problems with the uploaded file itself, detected before any decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The request carried no file under the expected form field.
    #[error("No image file provided")]
    MissingFile,
    /// A file part was present but its filename was empty.
    #[error("No file selected")]
    EmptyFilename,
    /// The filename has no extension or one outside the allowed set.
    #[error("Invalid file type '{filename}'. Please upload an image.")]
    DisallowedExtension {
        /// The filename as declared by the client.
        filename: String,
    },
}

/// Which side of the request a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client sent something unusable (400-class).
    Client,
    /// The server failed to process a valid request (500-class).
    Server,
}

/// Enum representing the errors that can occur while classifying an image.
#[derive(Error, Debug)]
pub enum LesionError {
    /// The uploaded file failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The image bytes could not be decoded.
    #[error("could not read image file: {context}")]
    Decode {
        /// Additional context about what was being decoded.
        context: String,
        /// The decoder error, if the decoder produced one.
        #[source]
        source: Option<image::ImageError>,
    },

    /// The classifier returned an output the interpreter cannot map to a label.
    #[error("unexpected prediction shape: {message}")]
    PredictionShape {
        /// A message describing what was wrong with the output.
        message: String,
    },

    /// Error occurred while running the classifier.
    #[error("inference failed in model '{model_name}': {context}")]
    Inference {
        /// The name of the model where inference failed.
        model_name: String,
        /// Additional context about the inference error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor reshaping.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// Error loading a model file, with context and suggestions.
    #[error("model load failed for '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        /// Path to the model that failed to load
        model_path: String,
        /// Short reason string
        reason: String,
        /// Optional suggestion (prefixed with '; ' when present)
        suggestion: String,
        /// Underlying source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LesionError {
    /// Returns whether this error should be reported as a client or server failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Client,
            _ => ErrorKind::Server,
        }
    }

    /// Creates a prediction shape error.
    pub fn prediction_shape(message: impl Into<String>) -> Self {
        Self::PredictionShape {
            message: message.into(),
        }
    }

    /// Creates a decode error for data that produced no image and no decoder error.
    pub fn decode(context: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
            source: None,
        }
    }

    /// Creates a configuration error for invalid field values.
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ConfigError {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual.into()
            ),
        }
    }

    /// Creates a model load error, appending the suggestion when one is given.
    pub fn model_load_error(
        model_path: &std::path::Path,
        reason: impl Into<String>,
        suggestion: Option<&str>,
        source: Option<ort::Error>,
    ) -> Self {
        Self::ModelLoad {
            model_path: model_path.display().to_string(),
            reason: reason.into(),
            suggestion: suggestion.map(|s| format!("; {s}")).unwrap_or_default(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_client_errors() {
        let err: LesionError = ValidationError::MissingFile.into();
        assert_eq!(err.kind(), ErrorKind::Client);

        let err: LesionError = ValidationError::DisallowedExtension {
            filename: "malware.exe".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Client);
        assert!(err.to_string().contains("malware.exe"));
    }

    #[test]
    fn test_core_failures_are_server_errors() {
        assert_eq!(LesionError::decode("empty").kind(), ErrorKind::Server);
        assert_eq!(
            LesionError::prediction_shape("no outputs").kind(),
            ErrorKind::Server
        );
    }

    #[test]
    fn test_model_load_error_suggestion() {
        let err = LesionError::model_load_error(
            std::path::Path::new("models/missing.onnx"),
            "file not found",
            Some("export the model to ONNX first"),
            None,
        );
        assert_eq!(
            err.to_string(),
            "model load failed for 'models/missing.onnx': file not found; export the model to ONNX first"
        );
    }
}
