//! Domain types for skin-lesion classification.
//!
//! - [`SourceImage`]: a validated upload
//! - [`PredictionScores`] and [`interpret`]: raw classifier output to label
//! - [`ClassificationResult`]: what the caller gets back

pub mod prediction;
pub mod result;
pub mod source_image;

pub use prediction::{PredictionScores, interpret};
pub use result::{ClassificationResult, Label};
pub use source_image::{SourceImage, is_allowed_file};
