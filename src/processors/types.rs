//! Types used in image processing operations
//!
//! This module defines the enums describing how pixel data is laid out and how
//! it is resampled on its way into the classifier.
use std::str::FromStr;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::core::LesionError;

/// Specifies the color channel order in an image buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorOrder {
    /// Red, Green, Blue order (default for image-rs decoders)
    #[default]
    RGB,
    /// Blue, Green, Red order (used by OpenCV-style bitmap decoders)
    BGR,
}

impl ColorOrder {
    /// Source channel index for each RGB output channel.
    pub fn rgb_source_indices(self) -> [usize; 3] {
        match self {
            ColorOrder::RGB => [0, 1, 2],
            ColorOrder::BGR => [2, 1, 0],
        }
    }
}

impl FromStr for ColorOrder {
    type Err = LesionError;

    fn from_str(order: &str) -> Result<Self, Self::Err> {
        match order.to_ascii_lowercase().as_str() {
            "rgb" => Ok(ColorOrder::RGB),
            "bgr" => Ok(ColorOrder::BGR),
            _ => Err(LesionError::invalid_field("color_order", "'rgb' or 'bgr'", order)),
        }
    }
}

/// Interpolation used when resizing to the classifier input size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest neighbour
    Nearest,
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Bicubic (Catmull-Rom) interpolation
    Bicubic,
    /// Lanczos with window 3
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
            ResizeFilter::Bicubic => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_order_from_str() {
        assert_eq!("RGB".parse::<ColorOrder>().unwrap(), ColorOrder::RGB);
        assert_eq!("bgr".parse::<ColorOrder>().unwrap(), ColorOrder::BGR);
        assert!("rgba".parse::<ColorOrder>().is_err());
    }

    #[test]
    fn test_bgr_source_indices_swap_red_and_blue() {
        assert_eq!(ColorOrder::RGB.rgb_source_indices(), [0, 1, 2]);
        assert_eq!(ColorOrder::BGR.rgb_source_indices(), [2, 1, 0]);
    }

    #[test]
    fn test_resize_filter_serde() {
        let filter: ResizeFilter = serde_json::from_str("\"lanczos3\"").unwrap();
        assert_eq!(filter, ResizeFilter::Lanczos3);
        assert_eq!(FilterType::from(ResizeFilter::default()), FilterType::Triangle);
    }
}
