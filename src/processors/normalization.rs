//! Image normalization for the lesion classifier.
//!
//! This module turns uploaded image bytes into the tensor the classifier was
//! trained on: RGB channel order, a fixed square input size, intensities scaled
//! to [0, 1], and a leading batch dimension of one (NHWC).

use crate::core::{DEFAULT_INPUT_SIZE, INPUT_CHANNELS, LesionError, PIXEL_MAX, Tensor4D};
use crate::domain::SourceImage;
use crate::processors::types::{ColorOrder, ResizeFilter};
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Configuration for [`NormalizeImage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Input shape (height, width)
    pub input_shape: (u32, u32),
    /// Resizing filter to use
    pub resize_filter: ResizeFilter,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            input_shape: (DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE),
            resize_filter: ResizeFilter::Bilinear,
        }
    }
}

impl NormalizerConfig {
    /// Checks that the configuration describes a usable input.
    pub fn validate(&self) -> Result<(), LesionError> {
        let (height, width) = self.input_shape;
        if height == 0 || width == 0 {
            return Err(LesionError::invalid_field(
                "input_shape",
                "non-zero height and width",
                format!("{height}x{width}"),
            ));
        }
        Ok(())
    }
}

/// Normalizes images into classifier input tensors.
///
/// Every tensor produced has shape `(1, height, width, 3)`, RGB channel order
/// and values in `[0.0, 1.0]`. The aspect ratio of the source is not preserved.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    config: NormalizerConfig,
}

impl Default for NormalizeImage {
    fn default() -> Self {
        Self {
            config: NormalizerConfig::default(),
        }
    }
}

impl NormalizeImage {
    /// Creates a normalizer after validating `config`.
    pub fn new(config: NormalizerConfig) -> Result<Self, LesionError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Decodes and normalizes an uploaded image.
    ///
    /// # Errors
    ///
    /// Returns [`LesionError::Decode`] when the bytes are empty or are not a
    /// readable image, whatever the declared extension says.
    pub fn normalize(&self, source: &SourceImage) -> Result<Tensor4D, LesionError> {
        if source.bytes().is_empty() {
            return Err(LesionError::decode(format!(
                "'{}' contains no data",
                source.filename()
            )));
        }

        let img = image::load_from_memory(source.bytes()).map_err(|e| LesionError::Decode {
            context: format!("'{}' is not a readable image", source.filename()),
            source: Some(e),
        })?;

        Ok(self.normalize_image(&img))
    }

    /// Normalizes an already decoded image.
    ///
    /// Alpha is dropped and grayscale is expanded to three channels.
    pub fn normalize_image(&self, img: &DynamicImage) -> Tensor4D {
        // image-rs decoders always yield RGB.
        self.normalize_rgb(&img.to_rgb8(), ColorOrder::RGB)
    }

    /// Normalizes a raw interleaved 8-bit buffer whose channels are in `order`.
    ///
    /// # Errors
    ///
    /// Returns [`LesionError::Decode`] when `data` does not hold exactly
    /// `width * height * 3` bytes.
    pub fn normalize_raw(
        &self,
        width: u32,
        height: u32,
        data: Vec<u8>,
        order: ColorOrder,
    ) -> Result<Tensor4D, LesionError> {
        let len = data.len();
        let buffer = RgbImage::from_raw(width, height, data).ok_or_else(|| {
            LesionError::decode(format!(
                "raw buffer of {len} bytes does not match {width}x{height}x{INPUT_CHANNELS}"
            ))
        })?;
        if width == 0 || height == 0 {
            return Err(LesionError::decode("raw buffer has a zero dimension"));
        }
        Ok(self.normalize_rgb(&buffer, order))
    }

    /// Resizes a three-channel buffer and writes it out as an RGB tensor.
    ///
    /// `order` describes how the channels are stored in `buffer`; a BGR buffer
    /// has its red and blue channels swapped on the way out.
    pub fn normalize_rgb(&self, buffer: &RgbImage, order: ColorOrder) -> Tensor4D {
        let (target_h, target_w) = self.config.input_shape;
        let resized = if buffer.dimensions() == (target_w, target_h) {
            buffer.clone()
        } else {
            image::imageops::resize(
                buffer,
                target_w,
                target_h,
                self.config.resize_filter.into(),
            )
        };

        let src_channels = order.rgb_source_indices();
        let mut tensor =
            Tensor4D::zeros((1, target_h as usize, target_w as usize, INPUT_CHANNELS));

        for (x, y, pixel) in resized.enumerate_pixels() {
            for (c, &src_c) in src_channels.iter().enumerate() {
                tensor[[0, y as usize, x as usize, c]] = pixel[src_c] as f32 / PIXEL_MAX;
            }
        }

        tensor
    }
}
