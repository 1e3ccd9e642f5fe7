//! Grid collaborators constraining row/column scans.
//!
//! Grid offsets are absolute die-image coordinates: y offsets for row grids,
//! x offsets for column grids.

use crate::util::{GateMatchError, GateMatchResult};
use std::collections::BTreeSet;

/// An ordered set of grid-line offsets that can be switched on or off.
pub trait Grid {
    fn is_enabled(&self) -> bool;

    /// Offsets in ascending order without duplicates.
    fn offsets(&self) -> Vec<usize>;
}

/// Equidistant grid lines `min, min + distance, ...` up to `max`.
#[derive(Clone, Debug, PartialEq)]
pub struct RegularGrid {
    enabled: bool,
    min: usize,
    max: usize,
    distance: usize,
}

impl RegularGrid {
    pub fn new(min: usize, max: usize, distance: usize) -> GateMatchResult<Self> {
        if distance == 0 {
            return Err(GateMatchError::InvalidInput("grid distance must be > 0"));
        }
        if max < min {
            return Err(GateMatchError::InvalidInput("grid max must be >= min"));
        }
        Ok(Self {
            enabled: true,
            min,
            max,
            distance,
        })
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn distance(&self) -> usize {
        self.distance
    }
}

impl Grid for RegularGrid {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn offsets(&self) -> Vec<usize> {
        (self.min..=self.max).step_by(self.distance).collect()
    }
}

/// Grid lines at arbitrary offsets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IrregularGrid {
    enabled: bool,
    offsets: BTreeSet<usize>,
}

impl IrregularGrid {
    pub fn new(offsets: impl IntoIterator<Item = usize>) -> Self {
        Self {
            enabled: true,
            offsets: offsets.into_iter().collect(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn add_offset(&mut self, offset: usize) {
        self.offsets.insert(offset);
    }
}

impl Grid for IrregularGrid {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn offsets(&self) -> Vec<usize> {
        self.offsets.iter().copied().collect()
    }
}

/// The regular and irregular grid for one axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridSet {
    pub regular: Option<RegularGrid>,
    pub irregular: Option<IrregularGrid>,
}

impl GridSet {
    /// Offsets of the first enabled grid, checking the regular grid first.
    pub fn active_offsets(&self) -> Option<Vec<usize>> {
        if let Some(grid) = self.regular.as_ref().filter(|g| g.is_enabled()) {
            return Some(grid.offsets());
        }
        self.irregular
            .as_ref()
            .filter(|g| g.is_enabled())
            .map(Grid::offsets)
    }
}
