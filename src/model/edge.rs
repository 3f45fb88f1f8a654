//! Edge (connector) between two lattice-adjacent nodes.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// Opaque edge handle: an index into `Grid::edges()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Lattice direction of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A connector that carries activation between its endpoints.
///
/// Propagation is directional per activation event, not per edge: `source`
/// records which endpoint fired the edge most recently and is cleared once
/// the edge has relayed to the other side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub a: NodeId,
    pub b: NodeId,
    pub orientation: Orientation,
    pub energy: u32,
    pub brightness: u32,
    pub source: Option<NodeId>,
}

impl Edge {
    pub fn new(id: EdgeId, a: NodeId, b: NodeId, orientation: Orientation) -> Self {
        Self {
            id,
            a,
            b,
            orientation,
            energy: 0,
            brightness: 0,
            source: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.energy > 0
    }

    pub fn intensity(&self) -> u32 {
        self.brightness.saturating_add(self.energy.saturating_mul(2))
    }

    /// The endpoint opposite `from`, or `None` if `from` is not an endpoint.
    pub fn other_endpoint(&self, from: NodeId) -> Option<NodeId> {
        if from == self.a { Some(self.b) }
        else if from == self.b { Some(self.a) }
        else { None }
    }

    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    pub(crate) fn activate(&mut self, from: NodeId, max_energy: u32, brightness: u32) {
        self.energy = max_energy;
        self.brightness = brightness;
        self.source = Some(from);
    }
}
