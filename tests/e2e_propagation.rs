//! End-to-end tests for activation propagation over built grids.
//!
//! Each test builds a grid through `GraphBuilder`, places activation by
//! hand where the scenario needs it, and steps `ActivationEngine`.

use neural_grid::{
    ActivationEngine, GraphBuilder, Grid, GridPos, NodeId, SimulationConfig, TickStatus,
};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ============================================================================
// Helpers
// ============================================================================

/// max_energy 20, fire threshold 18.
fn config() -> SimulationConfig {
    SimulationConfig { fire_delay: 2, ..SimulationConfig::default().with_fixed_energy(20) }
}

fn build(config: &SimulationConfig, n: usize, seed: u64) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    let side = 40.0 * n as f32;
    GraphBuilder::new(config).build_grid(n, side, side, &mut rng)
}

/// A quenched grid with only the node at `cell` charged.
fn seeded_at(mut grid: Grid, cell: GridPos) -> (Grid, NodeId) {
    grid.quench();
    let id = grid.node_at(cell).unwrap();
    assert!(grid.ignite(id));
    (grid, id)
}

// ============================================================================
// 1. Centre node fires every incident edge after two ticks
// ============================================================================

#[test]
fn test_center_fires_after_two_ticks() {
    let config = config();
    for seed in 0..20 {
        let (mut grid, center) = seeded_at(build(&config, 5, seed), GridPos::new(2, 2));
        let mut engine = ActivationEngine::new();

        engine.tick(&mut grid);
        assert_eq!(grid.node(center).unwrap().energy, 19);
        assert!(grid.edges().iter().all(|e| e.energy == 0));

        engine.tick(&mut grid);
        let node = grid.node(center).unwrap();
        assert_eq!(node.energy, 18);
        assert!(!node.pending_fire);
        assert!(node.edges.len() <= 4);
        for edge in grid.incident_edges(center) {
            assert_eq!(edge.energy, 20, "seed {seed}: {}", edge.id);
            assert_eq!(edge.source, Some(center));
        }
        let untouched = grid.edges().iter().filter(|e| e.a != center && e.b != center);
        for edge in untouched {
            assert_eq!(edge.energy, 0);
        }
        grid.check_invariants().unwrap();
    }
}

#[test]
fn test_center_with_all_four_links() {
    let config = SimulationConfig {
        horizontal_link_weight: 0.0,
        vertical_link_weight: 0.0,
        ..config()
    };
    let (mut grid, center) = seeded_at(build(&config, 5, 1), GridPos::new(2, 2));
    for cell in [GridPos::new(1, 2), GridPos::new(3, 2), GridPos::new(2, 1), GridPos::new(2, 3)] {
        let other = grid.node_at(cell).unwrap();
        grid.link(center, other).unwrap();
    }

    let mut engine = ActivationEngine::new();
    engine.tick(&mut grid);
    let result = engine.tick(&mut grid);

    assert_eq!(result.nodes_fired, 1);
    assert_eq!(result.edges_activated, 4);
    assert_eq!(grid.incident_edges(center).count(), 4);
    assert!(grid.incident_edges(center).all(|e| e.energy == 20 && e.source == Some(center)));
}

// ============================================================================
// 2. Isolated node fires into nothing
// ============================================================================

#[test]
fn test_isolated_node_fires_into_nothing() {
    let config = SimulationConfig {
        horizontal_link_weight: 0.0,
        vertical_link_weight: 0.0,
        ..config()
    };
    let (mut grid, id) = seeded_at(build(&config, 4, 9), GridPos::new(1, 1));
    assert_eq!(grid.edge_count(), 0);
    let mut engine = ActivationEngine::new();

    engine.tick(&mut grid);
    assert!(grid.node(id).unwrap().pending_fire);

    let result = engine.tick(&mut grid);
    assert_eq!(result.nodes_fired, 1);
    assert_eq!(result.edges_activated, 0);
    assert!(!grid.node(id).unwrap().pending_fire);

    let mut ticks = 2;
    loop {
        let result = engine.tick(&mut grid);
        ticks += 1;
        if result.status() == TickStatus::Quiescent {
            break;
        }
        assert_eq!(result.active_nodes, 1);
        assert!(ticks < 100, "isolated node never settled");
    }
    assert_eq!(ticks, 20);
    assert_eq!(grid.node(id).unwrap().energy, 0);
    grid.check_invariants().unwrap();
}

// ============================================================================
// 3. Wavefront travels along a hand-wired path
// ============================================================================

#[test]
fn test_wave_travels_along_row() {
    let config = SimulationConfig {
        horizontal_link_weight: 0.0,
        vertical_link_weight: 0.0,
        ..config()
    };
    let (mut grid, start) = seeded_at(build(&config, 4, 2), GridPos::new(0, 0));
    let row: Vec<NodeId> = (0..4).map(|c| grid.node_at(GridPos::new(c, 0)).unwrap()).collect();
    for pair in row.windows(2) {
        grid.link(pair[0], pair[1]).unwrap();
    }
    assert_eq!(row[0], start);

    let mut engine = ActivationEngine::new();
    let ticks = engine.run_until_quiescent(&mut grid, 10_000).unwrap();

    for id in &row {
        assert_eq!(grid.node(*id).unwrap().activations, 1, "{id} never lit");
    }
    // Per hop: 2 ticks to fire, 11 ticks for the edge to fall below 10.
    assert_eq!(ticks, 3 * 13 + 20);
    let dark = grid.nodes().iter().filter(|n| n.cell.row > 0).all(|n| n.activations == 0);
    assert!(dark);
}

// ============================================================================
// 4. A busy target swallows the wave
// ============================================================================

#[test]
fn test_meeting_waves_dead_end() {
    let config = SimulationConfig {
        horizontal_link_weight: 0.0,
        vertical_link_weight: 0.0,
        ..config()
    };
    let (mut grid, left) = seeded_at(build(&config, 3, 4), GridPos::new(0, 0));
    let mid = grid.node_at(GridPos::new(1, 0)).unwrap();
    let right = grid.node_at(GridPos::new(2, 0)).unwrap();
    grid.link(left, mid).unwrap();
    grid.link(mid, right).unwrap();
    grid.ignite(right);

    let mut engine = ActivationEngine::new();
    engine.run_until_quiescent(&mut grid, 10_000).unwrap();

    // Both ends fire at mid on the same tick; the first relay lights it and
    // the second finds it busy.
    assert_eq!(grid.node(mid).unwrap().activations, 1);
    assert_eq!(grid.node(left).unwrap().activations, 1);
    assert_eq!(grid.node(right).unwrap().activations, 1);
}
