//! Convenience helpers for loading die images and templates via the `image`
//! crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage};
use crate::util::{GateMatchError, GateMatchResult};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> GateMatchResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Creates an owned grayscale image from a dynamic image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> GateMatchResult<OwnedImage> {
    let gray = img.to_luma8();
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> GateMatchResult<OwnedImage> {
    let img = image::open(path).map_err(|err| GateMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}
