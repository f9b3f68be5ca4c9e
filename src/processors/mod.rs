//! Image processing for the classifier input.
//!
//! Decoding, channel reordering, resizing and intensity scaling all live here;
//! the result is always a tensor ready to hand to a [`Classifier`](crate::core::Classifier).

pub mod normalization;
pub mod types;

pub use normalization::{NormalizeImage, NormalizerConfig};
pub use types::{ColorOrder, ResizeFilter};
