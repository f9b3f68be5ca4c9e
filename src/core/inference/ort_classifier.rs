//! ONNX Runtime backed classifier.

use super::{Classifier, RawPrediction, Tensor4D, TensorOutput};
use crate::core::LesionError;
use crate::core::config::{OrtExecutionProvider, OrtSessionConfig};
use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::{Session, builder::SessionBuilder};
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

const SESSION_CREATION_FAILURE: &str = "failed to create ONNX session";

/// Skin-lesion classifier running an ONNX export of the model.
///
/// The session is created once and reused for every request. ONNX Runtime needs
/// exclusive access to run a session, so calls are serialized through a mutex.
pub struct OrtClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_names: Vec<String>,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtClassifier")
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtClassifier {
    /// Creates a builder for the classifier.
    pub fn builder() -> OrtClassifierBuilder {
        OrtClassifierBuilder::new()
    }

    /// Returns the model path associated with this classifier.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Names of the declared model outputs, in order.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn inference_error(
        &self,
        context: String,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> LesionError {
        LesionError::Inference {
            model_name: self.model_name.clone(),
            context,
            source: Box::new(source),
        }
    }
}

impl Classifier for OrtClassifier {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn classify(&self, tensor: &Tensor4D) -> Result<RawPrediction, LesionError> {
        let input_shape = tensor.shape().to_vec();
        let input_tensor = TensorRef::from_array_view(tensor.view()).map_err(|e| {
            self.inference_error(
                format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session_guard = self.session.lock().map_err(|_| LesionError::Inference {
            model_name: self.model_name.clone(),
            context: "session lock poisoned by an earlier panic".to_string(),
            source: "session lock acquisition failed".into(),
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            self.inference_error(
                format!(
                    "ONNX Runtime inference failed with input '{}' of shape {:?}",
                    self.input_name, input_shape
                ),
                e,
            )
        })?;

        let mut results = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let (shape, data) = outputs[name.as_str()]
                .try_extract_tensor::<f32>()
                .map_err(|e| {
                    self.inference_error(format!("failed to extract output '{name}' as f32"), e)
                })?;
            // Dynamic dimensions are resolved by the time outputs exist.
            let shape = shape.iter().map(|&d| d.max(0) as usize).collect();
            results.push(TensorOutput::new(shape, data.to_vec())?);
        }

        debug!(
            model = %self.model_name,
            outputs = results.len(),
            "classifier returned outputs"
        );

        Ok(RawPrediction::new(results))
    }
}

/// Builder for [`OrtClassifier`].
#[derive(Debug, Default)]
pub struct OrtClassifierBuilder {
    ort_config: Option<OrtSessionConfig>,
    model_name: Option<String>,
    input_name: Option<String>,
}

impl OrtClassifierBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn with_ort_config(mut self, config: OrtSessionConfig) -> Self {
        self.ort_config = Some(config);
        self
    }

    /// Overrides the model name used in logs (defaults to the file stem).
    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Overrides the input tensor name (defaults to the first declared input).
    pub fn input_name(mut self, name: impl Into<String>) -> Self {
        self.input_name = Some(name.into());
        self
    }

    /// Loads the model and builds the classifier.
    pub fn build(self, model_path: impl AsRef<Path>) -> Result<OrtClassifier, LesionError> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(LesionError::model_load_error(
                path,
                "model file not found",
                Some("export the trained model to ONNX and point --model at it"),
                None,
            ));
        }

        let builder = Session::builder()?;
        let builder = match &self.ort_config {
            Some(cfg) => apply_ort_config(builder, cfg)?,
            None => builder.with_log_level(LogLevel::Error)?,
        };
        let session = builder.commit_from_file(path).map_err(|e| {
            LesionError::model_load_error(
                path,
                SESSION_CREATION_FAILURE,
                Some("check device/EP configuration and model file"),
                Some(e),
            )
        })?;

        let input_name = match self.input_name {
            Some(name) => name,
            None => session
                .inputs
                .first()
                .map(|input| input.name.clone())
                .ok_or_else(|| LesionError::ConfigError {
                    message: format!("model '{}' declares no inputs", path.display()),
                })?,
        };
        let output_names: Vec<String> = session
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect();
        if output_names.is_empty() {
            return Err(LesionError::ConfigError {
                message: format!("model '{}' declares no outputs", path.display()),
            });
        }

        let model_name = self
            .model_name
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unknown_model".to_string());

        Ok(OrtClassifier {
            session: Mutex::new(session),
            input_name,
            output_names,
            model_path: path.to_path_buf(),
            model_name,
        })
    }
}

fn apply_ort_config(
    mut builder: SessionBuilder,
    cfg: &OrtSessionConfig,
) -> Result<SessionBuilder, ort::Error> {
    builder = builder.with_log_level(LogLevel::Error)?;
    if let Some(intra) = cfg.intra_threads {
        builder = builder.with_intra_threads(intra)?;
    }
    if let Some(eps) = &cfg.execution_providers {
        let providers = build_execution_providers(eps)?;
        if !providers.is_empty() {
            builder = builder.with_execution_providers(providers)?;
        }
    }
    Ok(builder)
}

fn build_execution_providers(
    eps: &[OrtExecutionProvider],
) -> Result<Vec<ExecutionProviderDispatch>, ort::Error> {
    let mut providers = Vec::with_capacity(eps.len());
    for ep in eps {
        match ep {
            OrtExecutionProvider::CPU => {
                providers.push(ort::execution_providers::CPUExecutionProvider::default().build());
            }
            #[cfg(feature = "cuda")]
            OrtExecutionProvider::CUDA { device_id } => {
                let mut cuda_provider = ort::execution_providers::CUDAExecutionProvider::default();
                if let Some(id) = device_id {
                    cuda_provider = cuda_provider.with_device_id(*id);
                }
                providers.push(cuda_provider.build());
            }
            #[cfg(not(feature = "cuda"))]
            OrtExecutionProvider::CUDA { .. } => {
                return Err(ort::Error::new(
                    "CUDA execution provider requested but cuda feature is not enabled",
                ));
            }
        }
    }
    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_model_load_error() {
        let err = OrtClassifier::builder()
            .build("definitely/not/here.onnx")
            .unwrap_err();
        assert!(matches!(err, LesionError::ModelLoad { .. }));
        assert!(err.to_string().contains("model file not found"));
    }

    #[test]
    fn test_builder_overrides() {
        let builder = OrtClassifier::builder()
            .model_name("resnet_cam")
            .input_name("input_1")
            .with_ort_config(OrtSessionConfig::new().with_intra_threads(2));
        assert_eq!(builder.model_name.as_deref(), Some("resnet_cam"));
        assert_eq!(builder.input_name.as_deref(), Some("input_1"));
        assert_eq!(builder.ort_config.unwrap().intra_threads, Some(2));
    }
}
