//! Node (core) in the activation lattice.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use super::{EdgeId, GridPos, Point};

/// Opaque node handle: an index into `Grid::nodes()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A lattice vertex that holds and emits activation energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub cell: GridPos,
    /// Centre of the lattice cell in viewport coordinates.
    pub position: Point,
    pub hue: f32,
    /// Decaying counter in `[0, max_energy]`.
    pub energy: u32,
    /// Base brightness stamped on activation.
    pub brightness: u32,
    /// Incident edges. A lattice vertex never has more than four.
    pub edges: SmallVec<[EdgeId; 4]>,
    /// Set on activation; cleared once the node has fired its edges.
    pub pending_fire: bool,
    /// Number of activations since the grid was built.
    pub activations: u32,
}

impl Node {
    pub fn new(id: NodeId, cell: GridPos, position: Point, hue: f32) -> Self {
        Self {
            id,
            cell,
            position,
            hue,
            energy: 0,
            brightness: 0,
            edges: SmallVec::new(),
            pending_fire: false,
            activations: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.energy > 0
    }

    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    /// Drawing intensity: brightness plus the doubled energy.
    pub fn intensity(&self) -> u32 {
        self.brightness.saturating_add(self.energy.saturating_mul(2))
    }

    /// Charge the node to `max_energy` and arm it to fire.
    pub(crate) fn activate(&mut self, max_energy: u32, brightness: u32) {
        self.energy = max_energy;
        self.brightness = brightness;
        self.pending_fire = true;
        self.activations += 1;
    }
}
