//! Image views, gray conversion, and pyramid utilities.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are
//! zero-copy views into the same backing slice and retain the original stride.

use crate::util::{GateMatchError, GateMatchResult};

mod gray;
pub mod pyramid;

#[cfg(feature = "image-io")]
pub mod io;

pub use gray::GrayPixel;
pub use pyramid::{ImagePyramid, ImageSource, OwnedImage};

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> GateMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> GateMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(GateMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> GateMatchResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(GateMatchError::InvalidDimensions { width, height });
        }

        let out_of_bounds = GateMatchError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let fits = x
            .checked_add(width)
            .zip(y.checked_add(height))
            .is_some_and(|(end_x, end_y)| end_x <= self.width && end_y <= self.height);
        if !fits {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x;
        let data = self
            .data
            .get(start..)
            .ok_or(GateMatchError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.stride)
    }
}

impl<P: GrayPixel> ImageView<'_, P> {
    /// Converts the view into a contiguous single-channel `u8` image.
    pub fn to_gray(&self) -> GateMatchResult<OwnedImage> {
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            let row = self.row(y).ok_or(GateMatchError::BufferTooSmall {
                needed: (y + 1) * self.stride,
                got: self.data.len(),
            })?;
            data.extend(row.iter().map(GrayPixel::to_gray));
        }
        OwnedImage::new(data, self.width, self.height)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> GateMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(GateMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(GateMatchError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(GateMatchError::InvalidDimensions { width, height })?;
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::ImageView;
    use crate::util::GateMatchError;

    #[test]
    fn roi_keeps_stride_and_offsets() {
        let data: Vec<u8> = (0u8..20).collect();
        let view = ImageView::new(&data, 4, 4, 5).unwrap();
        let roi = view.roi(1, 2, 3, 2).unwrap();
        assert_eq!(roi.stride(), 5);
        assert_eq!(roi.row(0).unwrap(), &[11u8, 12, 13]);
        assert_eq!(roi.row(1).unwrap(), &[16u8, 17, 18]);
        assert!(roi.get(3, 0).is_none());
    }

    #[test]
    fn roi_rejects_overflowing_window() {
        let data = [0u8; 16];
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let err = view.roi(3, 0, 2, 1).err().unwrap();
        assert_eq!(
            err,
            GateMatchError::RoiOutOfBounds {
                x: 3,
                y: 0,
                width: 2,
                height: 1,
                img_width: 4,
                img_height: 4,
            }
        );
    }

    #[test]
    fn rgba_view_converts_to_luma() {
        let data = [[255u8, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 0], [10, 10, 10, 255]];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let gray = view.to_gray().unwrap();
        assert_eq!(gray.data(), &[76u8, 150, 29, 10]);
    }
}
