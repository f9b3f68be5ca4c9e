//! Configuration types for the classification server and CLI.

use std::path::PathBuf;

/// Configuration for loading the classifier
#[derive(Clone, Debug)]
pub struct ClassifierConfig {
    pub model: PathBuf,
    pub device: String,
}

/// Configuration for the HTTP server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub classifier: ClassifierConfig,
    pub host: String,
    pub port: u16,
    /// Directory uploads are stored in and served from
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}
