//! Utility functions for the classification pipeline.
//!
//! This module provides upload filename helpers and logging setup.

pub mod filename;

pub use filename::{secure_filename, unique_upload_name};

/// Initializes the tracing subscriber for logging.
///
/// Log levels are taken from `RUST_LOG`, e.g. `RUST_LOG=lesion_classifier=debug`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
