//! Classification logic shared between CLI and server modes.

use crate::config::ClassifierConfig;
use lesion_classifier::core::{ErrorKind, LesionError, OrtSessionConfig, ValidationError};
use lesion_classifier::domain::{ClassificationResult, Label, SourceImage};
use lesion_classifier::predictors::LesionPredictor;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Message returned to clients for any server-side failure.
pub const GENERIC_FAILURE: &str = "An error occurred while processing the image";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to download image: {0}")]
    Download(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error(transparent)]
    Classification(#[from] LesionError),
}

/// Successful classification response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub label: Label,
    /// Confidence with one decimal and a trailing `%`
    pub confidence: String,
    /// Confidence with one decimal, no `%`
    pub prediction_score: String,
    /// Relative path of the stored upload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
}

impl PredictResponse {
    pub fn from_result(
        result: &ClassificationResult,
        image: Option<String>,
        processing_time_ms: f64,
    ) -> Self {
        Self {
            success: true,
            label: result.label,
            confidence: result.confidence.clone(),
            prediction_score: result.prediction_score.clone(),
            image,
            processing_time_ms: Some(processing_time_ms),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Text safe to show to end users for a pipeline error.
///
/// Validation problems are described; anything else gets a generic message so
/// paths and internal detail never leak.
pub fn public_message(error: &LesionError) -> String {
    match (error.kind(), error) {
        (ErrorKind::Client, _) => error.to_string(),
        (ErrorKind::Server, LesionError::Decode { .. }) => {
            "Could not read image file".to_string()
        }
        (ErrorKind::Server, _) => GENERIC_FAILURE.to_string(),
    }
}

/// Builds a [`SourceImage`] from an upload's declared filename and contents.
pub fn source_from_upload(
    filename: Option<&str>,
    bytes: Vec<u8>,
) -> Result<SourceImage, ValidationError> {
    match filename {
        None => Err(ValidationError::MissingFile),
        Some("") => Err(ValidationError::EmptyFilename),
        Some(name) => SourceImage::new(name, bytes),
    }
}

/// Loads the classifier described by `config`.
pub fn build_predictor(config: &ClassifierConfig) -> Result<LesionPredictor, ServerError> {
    if !config.model.exists() {
        return Err(ServerError::ModelNotFound(format!(
            "Classifier model not found: {}",
            config.model.display()
        )));
    }

    let ort_config = OrtSessionConfig::from_device(&config.device)
        .map_err(|e| ServerError::Config(e.to_string()))?;

    let mut builder = LesionPredictor::builder();
    if let Some(ort_config) = ort_config {
        builder = builder.ort_session(ort_config);
    }

    Ok(builder.build(&config.model)?)
}

/// Download bytes from a URL
pub async fn download_bytes(url: &str) -> Result<Vec<u8>, ServerError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ServerError::Download(format!("Failed to fetch URL: {}", e)))?;

    if !response.status().is_success() {
        return Err(ServerError::Download(format!(
            "HTTP error: {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ServerError::Download(format!("Failed to read response body: {}", e)))?;

    Ok(bytes.to_vec())
}

/// Filename of the last path segment of a URL, ignoring query and fragment.
pub fn filename_from_url(url: &str) -> &str {
    let without_suffix = url.split(['?', '#']).next().unwrap_or_default();
    without_suffix
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Thread-safe predictor wrapped in Arc
pub type SharedPredictor = Arc<LesionPredictor>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://example.com/img/lesion.JPG?size=large#top"),
            "lesion.JPG"
        );
        assert_eq!(filename_from_url("https://example.com/a/b.png"), "b.png");
        assert_eq!(filename_from_url("https://example.com/download/"), "download");
    }

    #[test]
    fn test_source_from_upload() {
        assert_eq!(
            source_from_upload(None, vec![]).unwrap_err(),
            ValidationError::MissingFile
        );
        assert_eq!(
            source_from_upload(Some(""), vec![]).unwrap_err(),
            ValidationError::EmptyFilename
        );
        assert!(matches!(
            source_from_upload(Some("malware.exe"), vec![1]).unwrap_err(),
            ValidationError::DisallowedExtension { .. }
        ));
        assert!(source_from_upload(Some("lesion.png"), vec![1]).is_ok());
    }

    #[test]
    fn test_public_message_hides_internal_detail() {
        let decode = LesionError::decode("'/srv/uploads/secret.png' contains no data");
        assert_eq!(public_message(&decode), "Could not read image file");

        let shape = LesionError::prediction_shape("classifier returned no outputs");
        assert_eq!(public_message(&shape), GENERIC_FAILURE);

        let validation: LesionError = ValidationError::EmptyFilename.into();
        assert_eq!(public_message(&validation), "No file selected");
    }

    #[test]
    fn test_missing_model_reported() {
        let config = ClassifierConfig {
            model: "no/such/model.onnx".into(),
            device: "cpu".to_string(),
        };
        assert!(matches!(
            build_predictor(&config).unwrap_err(),
            ServerError::ModelNotFound(_)
        ));
    }
}
