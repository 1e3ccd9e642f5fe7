//! Collaborator interfaces the matcher is driven through, with in-memory
//! implementations.

mod grid;
mod logic;
mod progress;

pub use grid::{Grid, GridSet, IrregularGrid, RegularGrid};
pub use logic::{Gate, GateId, InMemoryLogicModel, LayerId, LogicModel, PlacedGate};
pub use progress::{NoProgress, Progress, ProgressControl};
