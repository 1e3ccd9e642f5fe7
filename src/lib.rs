//! GateMatch recognizes standard logic-gate cells in die images of
//! integrated circuits.
//!
//! Gate templates are matched by normalized cross-correlation: a coarse scan
//! at reduced resolution with an adaptive step, full-resolution hill
//! climbing from promising positions, and a greedy commit of non-overlapping
//! matches into a logic model. Window statistics come from summation tables,
//! so every score costs one template dot product.
//!
//! The host supplies the die image through [`ImageSource`], the placed gates
//! through [`LogicModel`], and progress/cancellation through [`Progress`].

pub mod background;
pub mod geometry;
pub mod image;
pub mod integral;
pub mod kernel;
pub mod lowlevel;
pub mod model;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use geometry::BoundingBox;
pub use image::{GrayPixel, ImagePyramid, ImageSource, ImageView, OwnedImage};
pub use model::{
    Gate, GateId, Grid, GridSet, InMemoryLogicModel, IrregularGrid, LayerId, LogicModel,
    NoProgress, PlacedGate, Progress, ProgressControl, RegularGrid,
};
pub use search::{MatchConfig, MatchFound, Matcher, RunSummary, SearchStrategy};
pub use template::{GateTemplate, LayerKind, Orientation, TemplateId};
pub use util::{GateMatchError, GateMatchResult};
