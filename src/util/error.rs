//! Error types for gatematch.

use thiserror::Error;

/// Result alias for gatematch operations.
pub type GateMatchResult<T> = std::result::Result<T, GateMatchError>;

/// Errors that can occur when preparing or running gate matching.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GateMatchError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the declared layout.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested ROI does not fit the image.
    #[error("roi ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height} image")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Bounding box extents violate `min <= max`.
    #[error("invalid bounding box: x {min_x}..={max_x}, y {min_y}..={max_y}")]
    InvalidBoundingBox {
        min_x: usize,
        max_x: usize,
        min_y: usize,
        max_y: usize,
    },
    /// The search area does not intersect the background image.
    #[error("search area does not intersect the {img_width}x{img_height} background")]
    InvalidSearchArea { img_width: usize, img_height: usize },
    /// A template image has zero variance at some resolution.
    #[error("degenerate template '{name}': {reason}")]
    DegenerateTemplate { name: String, reason: &'static str },
    /// A template is too small for the requested downscale factor.
    #[error("template '{name}' ({width}x{height}) is too small for scale {scale}")]
    TemplateTooSmall {
        name: String,
        width: usize,
        height: usize,
        scale: usize,
    },
    /// The template carries no image for the matching layer.
    #[error("template '{name}' has no image for layer {layer}")]
    MissingLayerImage { name: String, layer: &'static str },
    /// A configuration value is outside its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// Image loading or decoding failed.
    #[cfg(feature = "image-io")]
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// The run was canceled through the progress collaborator.
    #[error("matching run canceled")]
    Canceled,
}
