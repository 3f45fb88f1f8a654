//! # neural-grid — Cascading Activation Network
//!
//! A lattice of nodes joined by a sparse, randomly wired set of edges. One
//! node is charged; its energy decays one unit per tick, and on the way down
//! it fires its edges, which in turn charge the nodes on their far side.
//! When every node and edge has decayed to zero the grid is thrown away and
//! a new one is built.
//!
//! ## Design Principles
//!
//! 1. **Arena, not pointers**: `Grid` owns two typed vectors; nodes and
//!    edges refer to each other by `NodeId` / `EdgeId`
//! 2. **Engine is a state transition**: `ActivationEngine::tick` mutates a
//!    grid and reports a status; it never rebuilds anything itself
//! 3. **One owner**: `Simulation` holds the grid, RNG and viewport; resize,
//!    reset and the frame clock are explicit calls into it
//! 4. **Render is a contract**: hosts read a `Snapshot`, never the engine
//!
//! ## Quick Start
//!
//! ```rust
//! use neural_grid::{Action, Simulation, SimulationConfig};
//!
//! # fn example() -> neural_grid::Result<()> {
//! let config = SimulationConfig::default().with_seed(7);
//! let mut sim = Simulation::new(config, 800.0, 600.0)?;
//!
//! for _ in 0..120 {
//!     let step = sim.tick();
//!     if step.action == Action::Rebuild {
//!         println!("generation {} started", sim.generation());
//!     }
//!     for node in sim.snapshot().nodes() {
//!         let _ = (node.position, node.radius, node.intensity);
//!     }
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod builder;
pub mod engine;
pub mod monitor;
pub mod render;
pub mod driver;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Node, Edge, Grid, NodeId, EdgeId, GridPos, Point,
    Lattice, EnergyProfile, Orientation, MAX_ENERGY_CEILING,
};
pub use config::{SimulationConfig, EnergyPolicy, MAX_HUE_JITTER};
pub use builder::GraphBuilder;
pub use engine::{ActivationEngine, TickResult, TickStatus, quiescence_bound};
pub use monitor::{Action, QuiescenceMonitor};
pub use render::{RenderAdapter, Snapshot, NodeView, EdgeView, FrameData};
pub use driver::{AnimationLoop, FrameHost, FrameToken, LoopState, SimulationHandle};

// ============================================================================
// Simulation — the owning world object
// ============================================================================

/// Size of the area the grid is laid out on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Outcome of one [`Simulation::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub result: TickResult,
    /// `Rebuild` means the grid was replaced after this tick.
    pub action: Action,
}

/// Owns one generation at a time and every trigger that replaces it.
pub struct Simulation {
    config: SimulationConfig,
    rng: StdRng,
    engine: ActivationEngine,
    monitor: QuiescenceMonitor,
    grid: Grid,
    viewport: Viewport,
    generation: u64,
}

impl Simulation {
    /// Validate `config` and build the first generation.
    pub fn new(config: SimulationConfig, width: f32, height: f32) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let grid = GraphBuilder::new(&config).build_grid(config.grid_size, width, height, &mut rng);
        let monitor = QuiescenceMonitor::new(config.max_generation_ticks);
        Ok(Self {
            config,
            rng,
            engine: ActivationEngine::new(),
            monitor,
            grid,
            viewport: Viewport { width, height },
            generation: 0,
        })
    }

    /// Replace the grid with a fresh one sized to `width × height`.
    pub fn rebuild(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
        self.grid = GraphBuilder::new(&self.config)
            .build_grid(self.config.grid_size, width, height, &mut self.rng);
        self.monitor.begin_generation();
        self.generation += 1;
    }

    /// Viewport changed: rebuild at the new size.
    pub fn resize(&mut self, width: f32, height: f32) {
        debug!(width, height, "viewport resized");
        self.rebuild(width, height);
    }

    /// Rebuild immediately at the current size, whatever the grid is doing.
    pub fn reset(&mut self) {
        debug!(generation = self.generation, "explicit reset");
        let Viewport { width, height } = self.viewport;
        self.rebuild(width, height);
    }

    /// Advance one tick and rebuild if the generation is over.
    pub fn tick(&mut self) -> Step {
        let result = self.engine.tick(&mut self.grid);
        let action = self.monitor.after_tick(&result);
        if action == Action::Rebuild {
            let Viewport { width, height } = self.viewport;
            self.rebuild(width, height);
        }
        Step { result, action }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(&self.grid, self.generation)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Number of rebuilds since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ticks_in_generation(&self) -> u64 {
        self.monitor.ticks_in_generation()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("viewport", &self.viewport)
            .field("generation", &self.generation)
            .field("nodes", &self.grid.node_count())
            .field("edges", &self.grid.edge_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid edge: {0}")]
    InvalidEdge(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sim() -> Simulation {
        let config = SimulationConfig::default().with_seed(1).with_fixed_energy(6);
        Simulation::new(config, 200.0, 200.0).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimulationConfig { min_cell_spacing: -1.0, ..Default::default() };
        assert!(matches!(Simulation::new(config, 100.0, 100.0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_resize_rebuilds_at_new_size() {
        let mut sim = sim();
        assert_eq!(sim.grid().lattice().size, 10);
        sim.resize(100.0, 60.0);
        assert_eq!(sim.viewport(), Viewport { width: 100.0, height: 60.0 });
        assert_eq!(sim.grid().lattice().size, 3);
        assert_eq!(sim.generation(), 1);
        assert!(sim.grid().has_charged_node());
    }

    #[test]
    fn test_reset_keeps_viewport() {
        let mut sim = sim();
        sim.tick();
        sim.reset();
        assert_eq!(sim.generation(), 1);
        assert_eq!(sim.ticks_in_generation(), 0);
        assert_eq!(sim.viewport(), Viewport { width: 200.0, height: 200.0 });
        assert!(sim.grid().has_charged_node());
    }

    #[test]
    fn test_tick_rebuilds_on_quiescence() {
        let mut sim = sim();
        let mut rebuilt = false;
        for _ in 0..10_000 {
            let step = sim.tick();
            if step.action == Action::Rebuild {
                assert!(!step.result.any_active);
                assert_eq!(step.result.status(), TickStatus::Quiescent);
                rebuilt = true;
                break;
            }
        }
        assert!(rebuilt);
        assert_eq!(sim.generation(), 1);
        assert!(sim.grid().has_charged_node());
        sim.grid().check_invariants().unwrap();
    }

    #[test]
    fn test_oversized_energy_is_clamped() {
        let wide = Simulation::new(SimulationConfig::default().with_seed(1), 1.0e11, 200.0).unwrap();
        assert_eq!(wide.grid().profile().max_energy, MAX_ENERGY_CEILING);
        wide.grid().check_invariants().unwrap();

        let config = SimulationConfig::default().with_seed(1).with_fixed_energy(3_000_000_000);
        config.validate().unwrap();
        let mut sim = Simulation::new(config, 200.0, 200.0).unwrap();
        assert_eq!(sim.grid().profile().max_energy, MAX_ENERGY_CEILING);
        assert_eq!(sim.tick().action, Action::Continue);
        for node in sim.snapshot().nodes() {
            assert!(node.intensity <= 2 * MAX_ENERGY_CEILING);
        }
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidEdge("n1-n5: cells (1, 0) and (0, 1) are not adjacent".into());
        assert_eq!(err.to_string(), "Invalid edge: n1-n5: cells (1, 0) and (0, 1) are not adjacent");
    }
}
