//! ONNX Runtime configuration types and utilities.

use crate::core::LesionError;
use serde::{Deserialize, Serialize};

/// Execution providers for ONNX Runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum OrtExecutionProvider {
    /// CPU execution provider (always available)
    #[default]
    CPU,
    /// NVIDIA CUDA execution provider
    CUDA {
        /// CUDA device ID (default: 0)
        device_id: Option<i32>,
    },
}

/// Configuration for ONNX Runtime sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Execution providers in order of preference
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the execution providers, in order of preference.
    pub fn with_execution_providers(mut self, providers: Vec<OrtExecutionProvider>) -> Self {
        self.execution_providers = Some(providers);
        self
    }

    /// Parses a device string (`cpu`, `cuda`, `cuda:N`) into a session configuration.
    ///
    /// Returns `None` for `cpu`, which needs no explicit configuration.
    pub fn from_device(device: &str) -> Result<Option<Self>, LesionError> {
        let device_lower = device.trim().to_lowercase();

        if device_lower == "cpu" {
            return Ok(None);
        }

        if device_lower.starts_with("cuda") {
            let device_id = if device_lower == "cuda" {
                0
            } else if let Some(id_str) = device_lower.strip_prefix("cuda:") {
                id_str.parse::<i32>().map_err(|_| {
                    LesionError::invalid_field("device", "a numeric CUDA device id", device)
                })?
            } else {
                return Err(LesionError::invalid_field(
                    "device",
                    "'cuda' or 'cuda:N'",
                    device,
                ));
            };

            if !cfg!(feature = "cuda") {
                return Err(LesionError::ConfigError {
                    message: format!(
                        "CUDA device '{device}' requested but CUDA feature is not enabled"
                    ),
                });
            }

            return Ok(Some(Self::new().with_execution_providers(vec![
                OrtExecutionProvider::CUDA {
                    device_id: Some(device_id),
                },
                OrtExecutionProvider::CPU,
            ])));
        }

        Err(LesionError::invalid_field(
            "device",
            "'cpu', 'cuda' or 'cuda:N'",
            device,
        ))
    }
}
