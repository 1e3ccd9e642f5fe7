//! Axis-aligned integer rectangles in die-image pixel coordinates.

use crate::util::{GateMatchError, GateMatchResult};

/// Inclusive pixel extents `min_x..=max_x`, `min_y..=max_y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
}

impl BoundingBox {
    /// Creates a box, rejecting extents with `min > max`.
    pub fn new(min_x: usize, max_x: usize, min_y: usize, max_y: usize) -> GateMatchResult<Self> {
        if min_x > max_x || min_y > max_y {
            return Err(GateMatchError::InvalidBoundingBox {
                min_x,
                max_x,
                min_y,
                max_y,
            });
        }
        Ok(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Creates the box covering `width x height` pixels starting at `(x, y)`.
    ///
    /// Zero-sized footprints are invalid.
    pub fn from_origin_size(
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> GateMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(GateMatchError::InvalidDimensions { width, height });
        }
        Self::new(x, x + width - 1, y, y + height - 1)
    }

    pub fn min_x(&self) -> usize {
        self.min_x
    }

    pub fn max_x(&self) -> usize {
        self.max_x
    }

    pub fn min_y(&self) -> usize {
        self.min_y
    }

    pub fn max_y(&self) -> usize {
        self.max_y
    }

    /// Number of pixel columns covered.
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    /// Number of pixel rows covered.
    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Returns true if the two boxes share at least one pixel.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Returns the overlapping part of two boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            min_x: self.min_x.max(other.min_x),
            max_x: self.max_x.min(other.max_x),
            min_y: self.min_y.max(other.min_y),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Returns true if `(x, y)` lies inside the box.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}
