//! Error types for the classification pipeline.

mod types;

pub use types::{ErrorKind, LesionError, ValidationError};

/// Convenience alias used throughout the crate.
pub type LesionResult<T> = Result<T, LesionError>;
