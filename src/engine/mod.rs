//! Activation engine — one discrete step of decay and propagation.
//!
//! Each tick visits every node, then every edge:
//!
//! ```text
//! node  energy > 0 → energy -= 1
//!       pending_fire && energy <= fire_threshold
//!           → every dormant incident edge: energy = max, source = node
//!
//! edge  energy > 0 → energy -= 1
//!       source set && energy < max / 2
//!           → dormant far endpoint: energy = max, pending_fire
//!           → source cleared (an edge relays once per activation)
//! ```
//!
//! Entities activated during a tick start decaying on the next one. Edges
//! fired by nodes are therefore queued and charged after the edge pass.

use serde::Serialize;
use tracing::trace;

use crate::model::{EdgeId, Grid, NodeId};

// ============================================================================
// Tick result
// ============================================================================

/// Whether the grid still holds any energy after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TickStatus {
    Continue,
    Quiescent,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TickResult {
    /// Some node or edge has `energy > 0` after the tick.
    pub any_active: bool,
    /// Nodes that fired their edges.
    pub nodes_fired: usize,
    /// Edges that passed activation to their far endpoint (or tried to).
    pub edges_relayed: usize,
    pub nodes_activated: usize,
    pub edges_activated: usize,
    pub active_nodes: usize,
    pub active_edges: usize,
}

impl TickResult {
    pub fn status(&self) -> TickStatus {
        if self.any_active { TickStatus::Continue } else { TickStatus::Quiescent }
    }
}

// ============================================================================
// ActivationEngine
// ============================================================================

/// Advances a [`Grid`] one tick at a time.
///
/// The engine owns nothing but a scratch queue; all simulation state lives
/// in the grid, so the same engine can drive successive generations.
#[derive(Debug, Default)]
pub struct ActivationEngine {
    fired: Vec<(EdgeId, NodeId)>,
}

impl ActivationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, grid: &mut Grid) -> TickResult {
        let (profile, nodes, edges) = grid.parts_mut();
        let profile = *profile;
        let mut result = TickResult::default();
        self.fired.clear();

        for node in nodes.iter_mut() {
            if node.energy == 0 {
                continue;
            }
            node.energy -= 1;
            if node.pending_fire && profile.fires_at(node.energy) {
                for &eid in &node.edges {
                    if edges[eid.index()].energy == 0 {
                        self.fired.push((eid, node.id));
                    }
                }
                node.pending_fire = false;
                result.nodes_fired += 1;
            }
        }

        for edge in edges.iter_mut() {
            if edge.energy == 0 {
                continue;
            }
            edge.energy -= 1;
            let Some(source) = edge.source else { continue };
            if !profile.relays_at(edge.energy) {
                continue;
            }
            edge.source = None;
            result.edges_relayed += 1;
            if let Some(target) = edge.other_endpoint(source) {
                let node = &mut nodes[target.index()];
                if profile.can_activate(node) {
                    node.activate(profile.max_energy, profile.base_brightness);
                    result.nodes_activated += 1;
                }
            }
        }

        // First firing node in index order wins a shared edge.
        for &(eid, from) in &self.fired {
            let edge = &mut edges[eid.index()];
            if edge.energy == 0 {
                edge.activate(from, profile.max_energy, profile.base_brightness);
                result.edges_activated += 1;
            }
        }

        result.active_nodes = nodes.iter().filter(|n| n.is_active()).count();
        result.active_edges = edges.iter().filter(|e| e.is_active()).count();
        result.any_active = result.active_nodes + result.active_edges > 0;

        trace!(
            fired = result.nodes_fired,
            relayed = result.edges_relayed,
            active_nodes = result.active_nodes,
            active_edges = result.active_edges,
            "tick"
        );
        result
    }

    /// Tick until the grid is quiescent or `max_ticks` have run.
    ///
    /// Returns the number of ticks taken, or `None` if still active.
    pub fn run_until_quiescent(&mut self, grid: &mut Grid, max_ticks: u64) -> Option<u64> {
        for n in 1..=max_ticks {
            if !self.tick(grid).any_active {
                return Some(n);
            }
        }
        None
    }
}

/// Upper bound on ticks before a freshly built grid goes quiescent.
///
/// Every tick before quiescence has at least one active entity, and every
/// activation lasts at most `max_energy` ticks. Nodes are activated at most
/// `limit` times and each activation fires an edge at most once, so edges
/// are activated at most `2 * limit` times. `None` when activations are
/// unlimited.
pub fn quiescence_bound(grid: &Grid) -> Option<u64> {
    let profile = grid.profile();
    let limit = u64::from(profile.activation_limit?);
    let activations = limit * grid.node_count() as u64 + 2 * limit * grid.edge_count() as u64;
    Some((u64::from(profile.max_energy) + 1) * activations)
}
