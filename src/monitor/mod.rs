//! Quiescence monitor — decides when a generation is over.

use serde::Serialize;
use tracing::{info, warn};

use crate::engine::TickResult;

/// What the owner should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    /// Keep the current grid for the next tick.
    Continue,
    /// Replace the grid wholesale with a freshly built one.
    Rebuild,
}

/// Watches tick results for the end of a generation.
#[derive(Debug, Clone, Default)]
pub struct QuiescenceMonitor {
    max_generation_ticks: Option<u64>,
    ticks_in_generation: u64,
}

impl QuiescenceMonitor {
    pub fn new(max_generation_ticks: Option<u64>) -> Self {
        Self { max_generation_ticks, ticks_in_generation: 0 }
    }

    /// `Rebuild` once nothing is active, or once the generation has run
    /// past its tick cap.
    pub fn after_tick(&mut self, result: &TickResult) -> Action {
        self.ticks_in_generation += 1;
        if !result.any_active {
            info!(ticks = self.ticks_in_generation, "grid quiescent, rebuilding");
            return Action::Rebuild;
        }
        if let Some(cap) = self.max_generation_ticks {
            if self.ticks_in_generation >= cap {
                warn!(
                    ticks = self.ticks_in_generation,
                    active_nodes = result.active_nodes,
                    active_edges = result.active_edges,
                    "generation exceeded tick cap, forcing rebuild"
                );
                return Action::Rebuild;
            }
        }
        Action::Continue
    }

    /// Reset the per-generation counters after a rebuild.
    pub fn begin_generation(&mut self) {
        self.ticks_in_generation = 0;
    }

    pub fn ticks_in_generation(&self) -> u64 {
        self.ticks_in_generation
    }
}
