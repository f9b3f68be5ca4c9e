//! High-level predictors.

pub mod lesion;

pub use lesion::{LesionPredictor, LesionPredictorBuilder};
