//! Constants shared across the pipeline.

/// Input edge length the classifier was trained with.
pub const DEFAULT_INPUT_SIZE: u32 = 384;

/// Number of color channels in the classifier input.
pub const INPUT_CHANNELS: usize = 3;

/// Divisor mapping 8-bit intensities onto [0, 1].
pub const PIXEL_MAX: f32 = 255.0;

/// Probability above which a sigmoid score is labelled malignant.
pub const SIGMOID_THRESHOLD: f32 = 0.5;

/// Filename extensions accepted for upload (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
