//! Grid builder — lays out a randomized, degree-limited lattice.
//!
//! ```text
//!   o---o   o---o        horizontal pass: row by row, left to right
//!   |       |   |        vertical pass:   column by column, top to bottom
//!   o---o---o   o        link (a, b) iff uniform(0, weight) > deg(a) + deg(b)
//!       |       |
//!   o   o---o---o        one random node is seeded at max_energy
//! ```
//!
//! Nodes that already carry several edges are unlikely to gain more. That
//! keeps the graph sparse and makes a wavefront branch unpredictably
//! instead of flooding the lattice.

use rand::Rng;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::model::{EnergyProfile, Grid, Lattice, NodeId, Orientation};

/// Nodes per side never go below this.
pub const MIN_GRID_SIZE: usize = 2;

/// Builds fresh generations of the activation network.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'c> {
    config: &'c SimulationConfig,
}

impl<'c> GraphBuilder<'c> {
    pub fn new(config: &'c SimulationConfig) -> Self {
        Self { config }
    }

    /// Nodes per side for a viewport of the given height.
    ///
    /// The requested size is capped so cells are at least
    /// `min_cell_spacing` tall, and never drops below [`MIN_GRID_SIZE`].
    pub fn clamp_size(&self, grid_size: usize, height: f32) -> usize {
        let fit = (height / self.config.min_cell_spacing).floor();
        let fit = if fit.is_finite() && fit > 0.0 { fit as usize } else { 0 };
        grid_size.min(fit).max(MIN_GRID_SIZE)
    }

    /// Build a new, seeded grid for a `width × height` viewport.
    ///
    /// Degenerate inputs are clamped, never rejected: the result always has
    /// `n * n` nodes with `n >= 2` and exactly one node at `max_energy`.
    pub fn build_grid<R: Rng + ?Sized>(
        &self,
        grid_size: usize,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Grid {
        let config = self.config;
        let width = self.sanitize_extent(width);
        let height = self.sanitize_extent(height);
        let size = self.clamp_size(grid_size, height);
        if size != grid_size {
            debug!(requested = grid_size, size, height, "clamped grid size to viewport");
        }

        let lattice = Lattice::new(size, width, height);
        let profile = EnergyProfile::new(
            config.energy.max_energy(lattice.x_step),
            config.fire_delay,
            config.max_activations_per_node,
        );

        let mut grid = Grid::new(lattice, profile, |_| self.jitter_hue(rng));

        // Horizontal pass, row-major.
        for row in 0..size {
            for col in 0..size - 1 {
                let a = lattice_id(size, col, row);
                let b = lattice_id(size, col + 1, row);
                if wants_link(&grid, a, b, config.horizontal_link_weight, rng) {
                    grid.connect(a, b, Orientation::Horizontal);
                }
            }
        }

        // Vertical pass, column-major.
        for col in 0..size {
            for row in 0..size - 1 {
                let a = lattice_id(size, col, row);
                let b = lattice_id(size, col, row + 1);
                if wants_link(&grid, a, b, config.vertical_link_weight, rng) {
                    grid.connect(a, b, Orientation::Vertical);
                }
            }
        }

        let seed = NodeId(rng.gen_range(0..grid.node_count()) as u32);
        grid.ignite(seed);

        debug!(
            size,
            width,
            height,
            nodes = grid.node_count(),
            edges = grid.edge_count(),
            max_energy = profile.max_energy,
            seed = %seed,
            "built activation grid"
        );
        grid
    }

    fn sanitize_extent(&self, extent: f32) -> f32 {
        if extent.is_finite() && extent > 0.0 {
            extent
        } else {
            self.config.min_cell_spacing * MIN_GRID_SIZE as f32
        }
    }

    fn jitter_hue<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let jitter = self.config.hue_jitter;
        let offset = if jitter > 0.0 { rng.gen_range(-jitter..jitter) } else { 0.0 };
        (self.config.base_hue + offset).rem_euclid(360.0)
    }
}

fn lattice_id(size: usize, col: usize, row: usize) -> NodeId {
    debug_assert!(col < size && row < size);
    NodeId((row * size + col) as u32)
}

fn wants_link<R: Rng + ?Sized>(grid: &Grid, a: NodeId, b: NodeId, weight: f64, rng: &mut R) -> bool {
    if weight <= 0.0 {
        return false;
    }
    let degree = grid.nodes()[a.index()].degree() + grid.nodes()[b.index()].degree();
    rng.gen_range(0.0..weight) > degree as f64
}
