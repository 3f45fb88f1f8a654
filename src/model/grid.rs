//! Grid — the arena that owns every node and edge of one generation.
//!
//! Nodes and edges live in two typed vectors and refer to each other by
//! index handles (`NodeId`, `EdgeId`). Node `(col, row)` is stored at index
//! `row * size + col`.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use super::{Edge, EdgeId, Node, NodeId, Orientation};
use crate::{Error, Result};

// ============================================================================
// Geometry
// ============================================================================

/// Lattice coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub col: usize,
    pub row: usize,
}

impl GridPos {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// True when the two cells share a lattice side.
    pub fn is_adjacent(self, other: GridPos) -> bool {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row) == 1
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Regular lattice the grid was laid out on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// Nodes per side.
    pub size: usize,
    pub width: f32,
    pub height: f32,
    pub x_step: f32,
    pub y_step: f32,
    pub core_radius: f32,
}

impl Lattice {
    pub fn new(size: usize, width: f32, height: f32) -> Self {
        let x_step = width / size as f32;
        let y_step = height / size as f32;
        Self {
            size,
            width,
            height,
            x_step,
            y_step,
            core_radius: x_step / 8.0,
        }
    }

    /// Centre of the given cell.
    pub fn center(&self, cell: GridPos) -> Point {
        Point {
            x: self.x_step / 2.0 + cell.col as f32 * self.x_step,
            y: self.y_step / 2.0 + cell.row as f32 * self.y_step,
        }
    }
}

// ============================================================================
// Energy profile
// ============================================================================

/// Upper bound on `max_energy`. Larger charges are clamped to this.
pub const MAX_ENERGY_CEILING: u32 = 1 << 16;

/// Energy constants shared by every entity of one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyProfile {
    pub max_energy: u32,
    /// A pending node fires its edges once its energy has decayed to this.
    pub fire_threshold: u32,
    /// Brightness stamped on entities when they are activated.
    pub base_brightness: u32,
    /// Cap on node activations per generation; `None` is unlimited.
    pub activation_limit: Option<u32>,
}

impl EnergyProfile {
    pub fn new(max_energy: u32, fire_delay: u32, activation_limit: Option<u32>) -> Self {
        let max_energy = max_energy.clamp(2, MAX_ENERGY_CEILING);
        Self {
            max_energy,
            fire_threshold: max_energy.saturating_sub(fire_delay),
            base_brightness: 100u32.saturating_sub(max_energy.saturating_mul(2)),
            activation_limit,
        }
    }

    pub fn fires_at(&self, energy: u32) -> bool {
        energy <= self.fire_threshold
    }

    /// An edge relays once it has decayed below half of `max_energy`.
    pub fn relays_at(&self, energy: u32) -> bool {
        energy < self.max_energy.div_ceil(2)
    }

    pub fn can_activate(&self, node: &Node) -> bool {
        node.energy == 0 && self.activation_limit.is_none_or(|limit| node.activations < limit)
    }
}

// ============================================================================
// Grid
// ============================================================================

/// One generation of the activation network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    lattice: Lattice,
    profile: EnergyProfile,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Grid {
    /// An unwired grid of `size * size` dormant nodes.
    ///
    /// `hue` is called once per cell in row-major order.
    pub fn new(lattice: Lattice, profile: EnergyProfile, mut hue: impl FnMut(GridPos) -> f32) -> Self {
        let mut nodes = Vec::with_capacity(lattice.size * lattice.size);
        for row in 0..lattice.size {
            for col in 0..lattice.size {
                let cell = GridPos { col, row };
                let id = NodeId(nodes.len() as u32);
                nodes.push(Node::new(id, cell, lattice.center(cell), hue(cell)));
            }
        }
        Self { lattice, profile, nodes, edges: Vec::new() }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn profile(&self) -> &EnergyProfile {
        &self.profile
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    pub fn node_at(&self, cell: GridPos) -> Option<NodeId> {
        let size = self.lattice.size;
        (cell.col < size && cell.row < size).then(|| NodeId((cell.row * size + cell.col) as u32))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges incident to `id`, resolved.
    pub fn incident_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.edges.iter())
            .filter_map(|e| self.edge(*e))
    }

    pub fn any_active(&self) -> bool {
        self.nodes.iter().any(Node::is_active) || self.edges.iter().any(Edge::is_active)
    }

    /// True when some node holds the full charge.
    pub fn has_charged_node(&self) -> bool {
        self.nodes.iter().any(|n| n.energy == self.profile.max_energy)
    }

    /// Connect two lattice-adjacent nodes.
    pub fn link(&mut self, a: NodeId, b: NodeId) -> Result<EdgeId> {
        let (na, nb) = match (self.node(a), self.node(b)) {
            (Some(na), Some(nb)) => (na, nb),
            _ => return Err(Error::InvalidEdge(format!("{a}-{b}: endpoint out of range"))),
        };
        if !na.cell.is_adjacent(nb.cell) {
            return Err(Error::InvalidEdge(format!(
                "{a}-{b}: cells {} and {} are not adjacent", na.cell, nb.cell
            )));
        }
        if self.incident_edges(a).any(|e| e.connects(a, b)) {
            return Err(Error::InvalidEdge(format!("{a}-{b}: already connected")));
        }
        let orientation = if na.cell.row == nb.cell.row {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        Ok(self.connect(a, b, orientation))
    }

    /// Append an edge without validation. Callers guarantee adjacency and
    /// that the pair is not yet linked.
    pub(crate) fn connect(&mut self, a: NodeId, b: NodeId, orientation: Orientation) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge::new(id, a, b, orientation));
        self.nodes[a.index()].edges.push(id);
        self.nodes[b.index()].edges.push(id);
        id
    }

    /// Charge a node to `max_energy` and arm it to fire.
    ///
    /// Returns false if the node does not exist.
    pub fn ignite(&mut self, id: NodeId) -> bool {
        let EnergyProfile { max_energy, base_brightness, .. } = self.profile;
        match self.nodes.get_mut(id.index()) {
            Some(node) => {
                node.activate(max_energy, base_brightness);
                true
            }
            None => false,
        }
    }

    /// Return every entity to the dormant state and clear activation counts.
    pub fn quench(&mut self) {
        for node in &mut self.nodes {
            node.energy = 0;
            node.pending_fire = false;
            node.activations = 0;
        }
        for edge in &mut self.edges {
            edge.energy = 0;
            edge.source = None;
        }
    }

    pub(crate) fn parts_mut(&mut self) -> (&EnergyProfile, &mut [Node], &mut [Edge]) {
        (&self.profile, self.nodes.as_mut_slice(), self.edges.as_mut_slice())
    }

    /// Verify the structural and energy invariants of the grid.
    pub fn check_invariants(&self) -> Result<()> {
        let max = self.profile.max_energy;
        let size = self.lattice.size;
        if self.nodes.len() != size * size {
            return Err(Error::InvariantViolation(format!(
                "expected {} nodes, found {}", size * size, self.nodes.len()
            )));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.id.index() != i {
                return Err(Error::InvariantViolation(format!("node at index {i} has id {}", node.id)));
            }
            if node.energy > max {
                return Err(Error::InvariantViolation(format!(
                    "{} energy {} exceeds {max}", node.id, node.energy
                )));
            }
            if node.energy == 0 && node.pending_fire {
                return Err(Error::InvariantViolation(format!("dormant {} is pending fire", node.id)));
            }
            for eid in &node.edges {
                let touches = self.edge(*eid).is_some_and(|e| e.a == node.id || e.b == node.id);
                if !touches {
                    return Err(Error::InvariantViolation(format!(
                        "{} lists {eid} which does not touch it", node.id
                    )));
                }
            }
        }

        let mut pairs = HashSet::with_capacity(self.edges.len());
        for (i, edge) in self.edges.iter().enumerate() {
            if edge.id.index() != i {
                return Err(Error::InvariantViolation(format!("edge at index {i} has id {}", edge.id)));
            }
            let (Some(a), Some(b)) = (self.node(edge.a), self.node(edge.b)) else {
                return Err(Error::InvariantViolation(format!("{} has a dangling endpoint", edge.id)));
            };
            if edge.a == edge.b {
                return Err(Error::InvariantViolation(format!("{} is a self loop", edge.id)));
            }
            if !a.cell.is_adjacent(b.cell) {
                return Err(Error::InvariantViolation(format!(
                    "{} joins non-adjacent cells {} and {}", edge.id, a.cell, b.cell
                )));
            }
            if !pairs.insert((edge.a.min(edge.b), edge.a.max(edge.b))) {
                return Err(Error::InvariantViolation(format!(
                    "{} duplicates the link {}-{}", edge.id, edge.a, edge.b
                )));
            }
            if !a.edges.contains(&edge.id) || !b.edges.contains(&edge.id) {
                return Err(Error::InvariantViolation(format!(
                    "{} missing from an endpoint's incidence list", edge.id
                )));
            }
            if edge.energy > max {
                return Err(Error::InvariantViolation(format!(
                    "{} energy {} exceeds {max}", edge.id, edge.energy
                )));
            }
            match edge.source {
                Some(_) if edge.energy == 0 => {
                    return Err(Error::InvariantViolation(format!("dormant {} carries a source", edge.id)));
                }
                Some(src) if src != edge.a && src != edge.b => {
                    return Err(Error::InvariantViolation(format!(
                        "{} source {src} is not an endpoint", edge.id
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
