//! Logic-model collaborator: placed gates and the queries matching needs.

use crate::geometry::BoundingBox;
use crate::template::{Orientation, TemplateId};
use crate::util::GateMatchResult;

/// Index of a layer in the host's logic model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub usize);

/// Identifier the logic model assigns to an inserted gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GateId(pub u64);

/// A gate instance as handed to the logic model.
#[derive(Clone, Debug, PartialEq)]
pub struct Gate {
    /// Placement in die-image pixel coordinates.
    pub bbox: BoundingBox,
    /// Template the gate was recognized from.
    pub template_id: TemplateId,
    /// Resolved flip state.
    pub orientation: Orientation,
    /// Provenance text, e.g. `matched with corr=0.93 t_hc=0.40`.
    pub description: String,
}

/// Query and insertion contract the matcher relies on.
///
/// Implementations are assumed single-writer for the duration of a run.
pub trait LogicModel {
    /// Returns true if any gate on `layer` overlaps `region`.
    fn exists_gate_in_region(&self, layer: LayerId, region: &BoundingBox) -> bool;

    /// Distance to skip so a `width x height` window at `(x, y)` clears the
    /// gates it overlaps on `layer`, along x if `horizontal`, else along y.
    ///
    /// Returns 0 when the window overlaps no gate.
    fn distance_to_gate_boundary(
        &self,
        layer: LayerId,
        x: usize,
        y: usize,
        horizontal: bool,
        width: usize,
        height: usize,
    ) -> usize;

    /// Inserts a gate into `layer`.
    fn add_gate(&mut self, layer: LayerId, gate: Gate) -> GateMatchResult<GateId>;

    /// Derives the gate's ports from its template after insertion.
    fn update_ports(&mut self, gate: GateId) -> GateMatchResult<()>;
}

/// A gate stored by [`InMemoryLogicModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedGate {
    pub id: GateId,
    pub layer: LayerId,
    pub gate: Gate,
    pub ports_updated: bool,
}

/// Linear-scan logic model for tools, tests, and the CLI.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLogicModel {
    gates: Vec<PlacedGate>,
    next_id: u64,
}

impl InMemoryLogicModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// All placed gates in insertion order.
    pub fn gates(&self) -> &[PlacedGate] {
        &self.gates
    }

    /// Looks up a gate by id.
    pub fn gate(&self, id: GateId) -> Option<&PlacedGate> {
        self.gates.iter().find(|placed| placed.id == id)
    }

    fn overlapping<'a>(
        &'a self,
        layer: LayerId,
        region: &'a BoundingBox,
    ) -> impl Iterator<Item = &'a PlacedGate> + 'a {
        self.gates
            .iter()
            .filter(move |placed| placed.layer == layer && placed.gate.bbox.intersects(region))
    }
}

impl LogicModel for InMemoryLogicModel {
    fn exists_gate_in_region(&self, layer: LayerId, region: &BoundingBox) -> bool {
        self.overlapping(layer, region).next().is_some()
    }

    fn distance_to_gate_boundary(
        &self,
        layer: LayerId,
        x: usize,
        y: usize,
        horizontal: bool,
        width: usize,
        height: usize,
    ) -> usize {
        let window = match BoundingBox::from_origin_size(x, y, width, height) {
            Ok(window) => window,
            Err(_) => return 0,
        };
        self.overlapping(layer, &window)
            .map(|placed| {
                if horizontal {
                    placed.gate.bbox.max_x() + 1 - x
                } else {
                    placed.gate.bbox.max_y() + 1 - y
                }
            })
            .max()
            .unwrap_or(0)
    }

    fn add_gate(&mut self, layer: LayerId, gate: Gate) -> GateMatchResult<GateId> {
        let id = GateId(self.next_id);
        self.next_id += 1;
        self.gates.push(PlacedGate {
            id,
            layer,
            gate,
            ports_updated: false,
        });
        Ok(id)
    }

    fn update_ports(&mut self, gate: GateId) -> GateMatchResult<()> {
        if let Some(placed) = self.gates.iter_mut().find(|placed| placed.id == gate) {
            placed.ports_updated = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Gate, InMemoryLogicModel, LayerId, LogicModel};
    use crate::geometry::BoundingBox;
    use crate::template::{Orientation, TemplateId};

    fn gate(x: usize, y: usize, w: usize, h: usize) -> Gate {
        Gate {
            bbox: BoundingBox::from_origin_size(x, y, w, h).unwrap(),
            template_id: TemplateId(0),
            orientation: Orientation::Normal,
            description: String::new(),
        }
    }

    #[test]
    fn region_queries_respect_layers() {
        let mut model = InMemoryLogicModel::new();
        let id = model.add_gate(LayerId(2), gate(10, 10, 5, 5)).unwrap();
        model.update_ports(id).unwrap();

        let probe = BoundingBox::new(14, 20, 14, 20).unwrap();
        assert!(model.exists_gate_in_region(LayerId(2), &probe));
        assert!(!model.exists_gate_in_region(LayerId(1), &probe));
        assert!(model.gate(id).unwrap().ports_updated);
    }

    #[test]
    fn distance_jumps_past_overlapped_gates() {
        let mut model = InMemoryLogicModel::new();
        model.add_gate(LayerId(0), gate(10, 0, 5, 5)).unwrap();
        model.add_gate(LayerId(0), gate(12, 3, 10, 2)).unwrap();

        // Window x 8..=12, y 0..=3 overlaps both gates.
        assert_eq!(model.distance_to_gate_boundary(LayerId(0), 8, 0, true, 5, 4), 14);
        assert_eq!(model.distance_to_gate_boundary(LayerId(0), 8, 0, false, 5, 4), 5);
        assert_eq!(model.distance_to_gate_boundary(LayerId(0), 0, 0, true, 4, 4), 0);
    }
}
