//! Matching run: scan, climb, and commit.

use crate::background::{prepare_background, Background};
use crate::geometry::BoundingBox;
use crate::image::ImageSource;
use crate::model::{Gate, GateId, GridSet, LayerId, LogicModel, Progress};
use crate::search::climb::hill_climb;
use crate::search::strategy::{SearchState, SearchStrategy};
use crate::search::MatchConfig;
use crate::template::{
    prepare_template, GateTemplate, LayerKind, Orientation, PreparedTemplate, TemplateId,
};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::adaptive_step;
use crate::util::{GateMatchError, GateMatchResult};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A detection that passed both thresholds.
///
/// Coordinates are the top-left corner in die-image pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchFound {
    pub x: usize,
    pub y: usize,
    pub template_id: TemplateId,
    pub orientation: Orientation,
    pub width: usize,
    pub height: usize,
    /// Full-resolution correlation after hill climbing.
    pub correlation: f64,
    /// Coarse threshold in effect when the match was found.
    pub threshold_hc: f64,
}

impl MatchFound {
    /// Footprint of the matched gate.
    pub fn bbox(&self) -> GateMatchResult<BoundingBox> {
        BoundingBox::from_origin_size(self.x, self.y, self.width, self.height)
    }

    /// Provenance text stored on committed gates.
    pub fn description(&self) -> String {
        format!(
            "matched with corr={:.2} t_hc={:.2}",
            self.correlation, self.threshold_hc
        )
    }
}

fn match_cmp_desc(a: &MatchFound, b: &MatchFound) -> Ordering {
    b.correlation
        .total_cmp(&a.correlation)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
        .then_with(|| a.template_id.cmp(&b.template_id))
}

/// Outcome of a completed run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// All detections, best correlation first.
    pub matches: Vec<MatchFound>,
    /// Gates inserted into the logic model, in commit order.
    pub committed: Vec<GateId>,
    /// Detections discarded because their footprint was already occupied.
    pub rejected: usize,
}

/// Gate matcher over one search area of a die image.
///
/// # Example
/// ```no_run
/// use gatematch::{
///     BoundingBox, GateTemplate, ImagePyramid, ImageView, InMemoryLogicModel, LayerId,
///     LayerKind, MatchConfig, Matcher, NoProgress, OwnedImage, TemplateId,
/// };
///
/// # fn main() -> gatematch::GateMatchResult<()> {
/// let die = vec![0u8; 256 * 256];
/// let pyramid = ImagePyramid::build_u8(ImageView::from_slice(&die, 256, 256)?, 4)?;
/// let pattern = (0..24 * 16).map(|i| (i % 7 * 30) as u8).collect();
/// let cell = OwnedImage::new(pattern, 24, 16)?;
/// let inv = GateTemplate::new(TemplateId(1), "inv", [(LayerKind::Logic, cell)])?;
///
/// let matcher = Matcher::new()
///     .with_config(MatchConfig { scale_down: 2, ..MatchConfig::default() })
///     .with_templates(vec![inv])
///     .with_layers(LayerKind::Logic, LayerId(0))
///     .with_search_area(BoundingBox::new(0, 255, 0, 255)?);
///
/// let mut model = InMemoryLogicModel::new();
/// let summary = matcher.run(&pyramid, &mut model, &NoProgress)?;
/// println!("{} gates placed", summary.committed.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Matcher {
    cfg: MatchConfig,
    templates: Vec<GateTemplate>,
    orientations: Vec<Orientation>,
    matching_layer: LayerKind,
    insertion_layer: LayerId,
    search_area: Option<BoundingBox>,
    mode: SearchStrategy,
    row_grids: GridSet,
    column_grids: GridSet,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            cfg: MatchConfig::default(),
            templates: Vec::new(),
            orientations: vec![Orientation::Normal],
            matching_layer: LayerKind::Logic,
            insertion_layer: LayerId(0),
            search_area: None,
            mode: SearchStrategy::Normal,
            row_grids: GridSet::default(),
            column_grids: GridSet::default(),
        }
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the templates, ordered by descending footprint area so larger
    /// cells claim their area first.
    pub fn with_templates(mut self, mut templates: Vec<GateTemplate>) -> Self {
        templates.sort_by(|a, b| b.area().cmp(&a.area()));
        self.templates = templates;
        self
    }

    /// Orientations tried for every template, in order.
    pub fn with_orientations(mut self, orientations: Vec<Orientation>) -> Self {
        self.orientations = orientations;
        self
    }

    /// Selects the template layer that is matched and the logic-model layer
    /// gates are inserted into.
    pub fn with_layers(mut self, matching: LayerKind, insertion: LayerId) -> Self {
        self.matching_layer = matching;
        self.insertion_layer = insertion;
        self
    }

    /// Restricts the search to `area`; the whole image otherwise.
    pub fn with_search_area(mut self, area: BoundingBox) -> Self {
        self.search_area = Some(area);
        self
    }

    pub fn with_mode(mut self, mode: SearchStrategy) -> Self {
        self.mode = mode;
        self
    }

    /// Row grids consulted by [`SearchStrategy::InRows`].
    pub fn with_row_grids(mut self, grids: GridSet) -> Self {
        self.row_grids = grids;
        self
    }

    /// Column grids consulted by [`SearchStrategy::InCols`].
    pub fn with_column_grids(mut self, grids: GridSet) -> Self {
        self.column_grids = grids;
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Templates in matching order.
    pub fn templates(&self) -> &[GateTemplate] {
        &self.templates
    }

    /// Runs matching over `source` and commits accepted gates into `model`.
    ///
    /// Every template is prepared once before scanning so a degenerate or
    /// undersized template fails the run without side effects. On
    /// cancellation nothing is committed, progress is reset, and
    /// [`GateMatchError::Canceled`] is returned.
    ///
    /// Commits are not transactional: if the model rejects an insertion or
    /// a port update, the error is returned as is and gates committed before
    /// it stay in the model.
    pub fn run<S, M, P>(
        &self,
        source: &S,
        model: &mut M,
        progress: &P,
    ) -> GateMatchResult<RunSummary>
    where
        S: ImageSource,
        M: LogicModel + ?Sized,
        P: Progress + ?Sized,
    {
        self.cfg.validate()?;
        if self.orientations.is_empty() {
            return Err(GateMatchError::InvalidConfig("no orientations selected"));
        }
        if self.templates.is_empty() {
            return Ok(RunSummary::default());
        }

        let grid = self.grid_offsets()?;
        let area = match self.search_area {
            Some(area) => area,
            None => {
                let (_, base) = source.image_for_scale(1);
                BoundingBox::from_origin_size(0, 0, base.width(), base.height())?
            }
        };
        let background = prepare_background(source, area, self.cfg.scale_down)?;

        for template in &self.templates {
            prepare_template(
                template,
                self.matching_layer,
                Orientation::Normal,
                background.scale(),
            )?;
        }

        let steps = self.templates.len() * self.orientations.len();
        progress.set_progress_step_size(1.0 / steps as f64);

        let mut matches = Vec::new();
        for template in &self.templates {
            for &orientation in &self.orientations {
                if progress.is_canceled() {
                    progress.reset_progress();
                    trace_event!("run_canceled", found = matches.len());
                    return Err(GateMatchError::Canceled);
                }
                let prepared = prepare_template(
                    template,
                    self.matching_layer,
                    orientation,
                    background.scale(),
                )?;
                self.scan(&background, &prepared, &grid, &*model, &mut matches);
                progress.progress_step_done();
            }
        }

        matches.sort_by(match_cmp_desc);
        self.commit(matches, model)
    }

    fn grid_offsets(&self) -> GateMatchResult<Vec<usize>> {
        match self.mode {
            SearchStrategy::Normal => Ok(Vec::new()),
            SearchStrategy::InRows => self
                .row_grids
                .active_offsets()
                .ok_or(GateMatchError::InvalidConfig("no enabled row grid")),
            SearchStrategy::InCols => self
                .column_grids
                .active_offsets()
                .ok_or(GateMatchError::InvalidConfig("no enabled column grid")),
        }
    }

    /// Scans one prepared template, appending detections to `out`.
    fn scan<M: LogicModel + ?Sized>(
        &self,
        background: &Background,
        tpl: &PreparedTemplate,
        grid: &[usize],
        model: &M,
        out: &mut Vec<MatchFound>,
    ) {
        let _span = trace_span!(
            "scan_template",
            template = tpl.template_id().0,
            orientation = tpl.orientation().name()
        )
        .entered();

        let scale = background.scale();
        let area = background.area();
        let mut state = SearchState::new(
            self.mode,
            self.insertion_layer,
            area,
            tpl,
            grid,
            self.cfg.max_step_size.saturating_mul(scale),
        );

        let mut seen = HashSet::new();
        let mut probes = 0usize;
        let found_before = out.len();
        while self.mode.get_next_pos(&mut state, tpl, model) {
            probes += 1;
            let (sx, sy) = background.scaled_position(state.x(), state.y());
            let corr = background.scaled().score(tpl.scaled(), sx, sy);

            if corr >= self.cfg.threshold_hc {
                let climb = hill_climb(
                    background.full(),
                    tpl.full(),
                    state.x(),
                    state.y(),
                    self.cfg.max_step_size,
                );
                let accepted = climb.score >= self.cfg.threshold_detection;
                if accepted && seen.insert((climb.x, climb.y)) {
                    out.push(MatchFound {
                        x: area.min_x() + climb.x,
                        y: area.min_y() + climb.y,
                        template_id: tpl.template_id(),
                        orientation: tpl.orientation(),
                        width: tpl.width(),
                        height: tpl.height(),
                        correlation: climb.score,
                        threshold_hc: self.cfg.threshold_hc,
                    });
                }
            }

            state.set_step(adaptive_step(corr, self.cfg.max_step_size).saturating_mul(scale));
        }

        trace_event!(
            "scan_done",
            probes = probes,
            matches = out.len() - found_before,
        );
    }

    /// Inserts matches best-first, skipping any whose footprint is taken.
    fn commit<M: LogicModel + ?Sized>(
        &self,
        matches: Vec<MatchFound>,
        model: &mut M,
    ) -> GateMatchResult<RunSummary> {
        let _span = trace_span!("commit", candidates = matches.len()).entered();

        let mut committed = Vec::new();
        let mut rejected = 0usize;
        for found in &matches {
            let bbox = found.bbox()?;
            if model.exists_gate_in_region(self.insertion_layer, &bbox) {
                rejected += 1;
                continue;
            }
            let gate = Gate {
                bbox,
                template_id: found.template_id,
                orientation: found.orientation,
                description: found.description(),
            };
            let id = model
                .add_gate(self.insertion_layer, gate)
                .map_err(|err| commit_failed(&committed, err))?;
            committed.push(id);
            model
                .update_ports(id)
                .map_err(|err| commit_failed(&committed, err))?;
        }

        trace_event!(
            "commit_done",
            committed = committed.len(),
            rejected = rejected,
        );
        Ok(RunSummary {
            matches,
            committed,
            rejected,
        })
    }
}

fn commit_failed(committed: &[GateId], err: GateMatchError) -> GateMatchError {
    trace_warn!("commit_failed", committed = committed.len());
    err
}
