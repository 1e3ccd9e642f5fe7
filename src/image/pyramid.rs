//! Owned grayscale images and the power-of-two image pyramid.
//!
//! Downsampling uses a 2x2 box filter with integer rounding:
//! `dst = ((a + b + c + d) + 2) / 4`. Level `i` of a pyramid has scale
//! factor `2^i` relative to the base image.

use crate::image::{GrayPixel, ImageView};
use crate::util::math::pow2_at_least;
use crate::util::{GateMatchError, GateMatchResult};

/// Owned contiguous grayscale image buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a contiguous row-major buffer of exactly `width * height` pixels.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> GateMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(GateMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(GateMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(GateMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(GateMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Copies a (possibly strided) view into a contiguous image.
    pub fn from_view(view: ImageView<'_, u8>) -> GateMatchResult<Self> {
        view.to_gray()
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Halves an image with a 2x2 box filter.
///
/// Returns `None` when either side is shorter than two pixels.
pub(crate) fn downsample_2x(src: ImageView<'_, u8>) -> Option<OwnedImage> {
    if src.width() < 2 || src.height() < 2 {
        return None;
    }
    let dst_width = src.width() / 2;
    let dst_height = src.height() / 2;
    let mut dst = Vec::with_capacity(dst_width * dst_height);

    for y in 0..dst_height {
        let row0 = src.row(y * 2)?;
        let row1 = src.row(y * 2 + 1)?;
        for x in 0..dst_width {
            let sum = u16::from(row0[2 * x])
                + u16::from(row0[2 * x + 1])
                + u16::from(row1[2 * x])
                + u16::from(row1[2 * x + 1]);
            dst.push(((sum + 2) / 4) as u8);
        }
    }

    OwnedImage::new(dst, dst_width, dst_height).ok()
}

/// Multi-resolution image collaborator.
///
/// Implementations return the level whose scale factor is the smallest power
/// of two `>= scale`. When no such level exists the unscaled image is
/// returned together with a scale of 1.
pub trait ImageSource {
    /// Pixel type stored in the pyramid levels.
    type Pixel: GrayPixel;

    /// Returns `(actual_scale, image)` for the requested downscale factor.
    fn image_for_scale(&self, scale: usize) -> (usize, ImageView<'_, Self::Pixel>);
}

/// Owned grayscale image pyramid built from a base level.
pub struct ImagePyramid {
    levels: Vec<OwnedImage>,
}

impl ImagePyramid {
    /// Builds a pyramid from a base grayscale view.
    ///
    /// `max_levels` is clamped to at least 1 so the base level is always
    /// present; building stops early once a level would drop below 2x2.
    pub fn build_u8(base: ImageView<'_, u8>, max_levels: usize) -> GateMatchResult<Self> {
        let max_levels = max_levels.max(1);
        let mut levels = vec![OwnedImage::from_view(base)?];

        while levels.len() < max_levels {
            let next = match levels.last().and_then(|prev| downsample_2x(prev.view())) {
                Some(next) => next,
                None => break,
            };
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// Returns all pyramid levels (level 0 is the base resolution).
    pub fn levels(&self) -> &[OwnedImage] {
        &self.levels
    }

    /// Returns a view for a specific pyramid level.
    pub fn level(&self, index: usize) -> Option<ImageView<'_, u8>> {
        self.levels.get(index).map(|level| level.view())
    }
}

impl ImageSource for ImagePyramid {
    type Pixel = u8;

    fn image_for_scale(&self, scale: usize) -> (usize, ImageView<'_, u8>) {
        let wanted = pow2_at_least(scale);
        let index = wanted.trailing_zeros() as usize;
        match self.level(index) {
            Some(view) => (wanted, view),
            None => (1, self.levels[0].view()),
        }
    }
}
