//! Position enumerators driving a template scan.
//!
//! Each strategy is a state machine over the search area:
//! `INIT -> PROBE -> (SKIP-OVER-EXISTING-GATE)* -> ADVANCE -> {PROBE | DONE}`.
//! Positions are full-resolution offsets relative to the search area's
//! top-left corner. The "inner" axis is stepped by the adaptive step; the
//! "outer" axis moves to the next row (or column) when the inner axis runs
//! out. Existing gates are skipped along the inner axis.

use crate::geometry::BoundingBox;
use crate::model::{LayerId, LogicModel};
use crate::template::PreparedTemplate;

/// How scan positions are enumerated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Free raster scan, left to right, top to bottom.
    #[default]
    Normal,
    /// Rows restricted to the row grid's offsets.
    InRows,
    /// Columns restricted to the column grid's offsets, scanned top to
    /// bottom one column at a time.
    InCols,
}

/// Mutable cursor of one (template, orientation) scan.
#[derive(Clone, Debug)]
pub struct SearchState {
    layer: LayerId,
    area: BoundingBox,
    tpl_width: usize,
    tpl_height: usize,
    /// Last valid placement offsets, `None` if the template does not fit.
    limits: Option<(usize, usize)>,
    x: usize,
    y: usize,
    step: usize,
    grid: Vec<usize>,
    grid_idx: usize,
    started: bool,
    done: bool,
}

impl SearchState {
    /// Creates the cursor for scanning `tpl` over `area`.
    ///
    /// `grid_offsets` are absolute coordinates of the constraining grid (row
    /// offsets for [`SearchStrategy::InRows`], column offsets for
    /// [`SearchStrategy::InCols`]); they are filtered once to the offsets at
    /// which the template fits. `step` is the initial inner-axis step.
    pub fn new(
        strategy: SearchStrategy,
        layer: LayerId,
        area: BoundingBox,
        tpl: &PreparedTemplate,
        grid_offsets: &[usize],
        step: usize,
    ) -> Self {
        let tpl_width = tpl.width();
        let tpl_height = tpl.height();
        let limits = (area.width() >= tpl_width && area.height() >= tpl_height)
            .then(|| (area.width() - tpl_width, area.height() - tpl_height));

        let grid = match (strategy, limits) {
            (SearchStrategy::InRows, Some((_, max_y))) => {
                filter_offsets(grid_offsets, area.min_y(), max_y)
            }
            (SearchStrategy::InCols, Some((max_x, _))) => {
                filter_offsets(grid_offsets, area.min_x(), max_x)
            }
            _ => Vec::new(),
        };

        Self {
            layer,
            area,
            tpl_width,
            tpl_height,
            limits,
            x: 0,
            y: 0,
            step: step.max(1),
            grid,
            grid_idx: 0,
            started: false,
            done: false,
        }
    }

    /// Current x offset relative to the search area.
    pub fn x(&self) -> usize {
        self.x
    }

    /// Current y offset relative to the search area.
    pub fn y(&self) -> usize {
        self.y
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Sets the inner-axis step used by the next advance.
    pub fn set_step(&mut self, step: usize) {
        self.step = step.max(1);
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Grid offsets (relative) the scan is restricted to.
    pub fn grid_offsets(&self) -> &[usize] {
        &self.grid
    }
}

fn filter_offsets(offsets: &[usize], origin: usize, max_rel: usize) -> Vec<usize> {
    let mut out: Vec<usize> = offsets
        .iter()
        .filter(|&&offset| offset >= origin && offset - origin <= max_rel)
        .map(|&offset| offset - origin)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

impl SearchStrategy {
    fn inner_is_x(self) -> bool {
        !matches!(self, SearchStrategy::InCols)
    }

    /// INIT: positions the cursor on the first candidate.
    fn start(self, s: &mut SearchState) -> bool {
        if s.limits.is_none() {
            return false;
        }
        s.x = 0;
        s.y = 0;
        match self {
            SearchStrategy::Normal => true,
            SearchStrategy::InRows => match s.grid.first() {
                Some(&y) => {
                    s.y = y;
                    true
                }
                None => false,
            },
            SearchStrategy::InCols => match s.grid.first() {
                Some(&x) => {
                    s.x = x;
                    true
                }
                None => false,
            },
        }
    }

    /// Moves the inner coordinate; false once it passes the last placement.
    fn advance_inner(self, s: &mut SearchState, by: usize) -> bool {
        let Some((max_x, max_y)) = s.limits else {
            return false;
        };
        if self.inner_is_x() {
            s.x = s.x.saturating_add(by);
            s.x <= max_x
        } else {
            s.y = s.y.saturating_add(by);
            s.y <= max_y
        }
    }

    /// Moves to the next row (or grid column); false when none is left.
    fn advance_outer(self, s: &mut SearchState) -> bool {
        let Some((_, max_y)) = s.limits else {
            return false;
        };
        match self {
            SearchStrategy::Normal => {
                let y = s.y.saturating_add(s.step);
                if y > max_y {
                    return false;
                }
                s.y = y;
                s.x = 0;
            }
            SearchStrategy::InRows => {
                s.grid_idx += 1;
                let Some(&y) = s.grid.get(s.grid_idx) else {
                    return false;
                };
                s.y = y;
                s.x = 0;
            }
            SearchStrategy::InCols => {
                s.grid_idx += 1;
                let Some(&x) = s.grid.get(s.grid_idx) else {
                    return false;
                };
                s.x = x;
                s.y = 0;
            }
        }
        true
    }

    fn advance(self, s: &mut SearchState, by: usize) -> bool {
        self.advance_inner(s, by) || self.advance_outer(s)
    }

    /// Produces the next probe position.
    ///
    /// The first call initializes the cursor. Each position is checked
    /// against gates already placed on the state's layer; overlapped windows
    /// are skipped along the inner axis until a free one is found. Returns
    /// false once the scan is complete, including immediately when the
    /// template does not fit the search area.
    pub fn get_next_pos<M: LogicModel + ?Sized>(
        self,
        s: &mut SearchState,
        tpl: &PreparedTemplate,
        model: &M,
    ) -> bool {
        debug_assert_eq!((tpl.width(), tpl.height()), (s.tpl_width, s.tpl_height));
        if s.done {
            return false;
        }
        let positioned = if s.started {
            self.advance(s, s.step)
        } else {
            s.started = true;
            self.start(s)
        };
        if !positioned {
            s.done = true;
            return false;
        }

        loop {
            let skip = model.distance_to_gate_boundary(
                s.layer,
                s.area.min_x() + s.x,
                s.area.min_y() + s.y,
                self.inner_is_x(),
                s.tpl_width,
                s.tpl_height,
            );
            if skip == 0 {
                return true;
            }
            if !self.advance(s, skip) {
                s.done = true;
                return false;
            }
        }
    }
}
