//! Error types for scalematch.

use thiserror::Error;

/// Result alias for scalematch operations.
pub type ScaleMatchResult<T> = std::result::Result<T, ScaleMatchError>;

/// Errors that can occur when locating a template.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScaleMatchError {
    /// Width or height is zero, or the buffer length overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested region does not fit inside the image.
    #[error(
        "roi {width}x{height} at ({x}, {y}) is out of bounds for {img_width}x{img_height} image"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// An input image is unreadable, missing, or has zero area.
    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },
    /// The template does not fit inside the target at any tested scale.
    #[error(
        "no valid scale: template {template_width}x{template_height} never fits strictly inside \
         target {target_width}x{target_height}"
    )]
    NoValidScale {
        template_width: usize,
        template_height: usize,
        target_width: usize,
        target_height: usize,
    },
    /// Writing the annotated debug image failed.
    #[error("debug image write failed: {reason}")]
    DebugWrite { reason: String },
    /// A configuration value is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
}
