//! Low-level building blocks for custom matching pipelines.
//!
//! These expose template preparation, summation tables, correlation kernels,
//! and the scan primitives used by [`Matcher`](crate::Matcher). Most users
//! should prefer the top-level `Matcher` API.

pub use crate::background::{prepare_background, Background, BackgroundLevel};
pub use crate::integral::SummationTables;
pub use crate::kernel::{score_at, score_at_with, Kernel, INVALID_SCORE};
pub use crate::search::{hill_climb, Climb, SearchState};
pub use crate::template::{prepare_template, PreparedTemplate, TemplateLevel};
