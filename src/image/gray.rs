//! Pixel types that can be reduced to a single gray channel.

/// A pixel convertible to an 8-bit gray value.
///
/// Color pixels use integer Rec. 601 luma weights
/// `(299 R + 587 G + 114 B + 500) / 1000`; alpha is ignored.
pub trait GrayPixel: Copy {
    /// Returns the gray value of the pixel.
    fn to_gray(&self) -> u8;
}

impl GrayPixel for u8 {
    #[inline]
    fn to_gray(&self) -> u8 {
        *self
    }
}

impl GrayPixel for [u8; 3] {
    #[inline]
    fn to_gray(&self) -> u8 {
        luma(self[0], self[1], self[2])
    }
}

impl GrayPixel for [u8; 4] {
    #[inline]
    fn to_gray(&self) -> u8 {
        luma(self[0], self[1], self[2])
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    ((weighted + 500) / 1000) as u8
}
