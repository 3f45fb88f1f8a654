//! Render contract — read-only views of the grid for drawing.
//!
//! The simulation never draws. A host implements [`RenderAdapter`] and
//! receives a [`Snapshot`] of the settled post-tick state, with the
//! cosmetic values (radius, line width, intensity) already derived.
//! Color conversion from hue and intensity is the host's business.

use serde::Serialize;

use crate::model::{Edge, Grid, Node, Orientation, Point};

/// Anything that can draw a frame of the simulation.
pub trait RenderAdapter {
    fn draw(&mut self, snapshot: &Snapshot<'_>);
}

/// Draw data for one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeView {
    pub position: Point,
    pub hue: f32,
    /// Used as both saturation and brightness.
    pub intensity: u32,
    pub radius: f32,
}

/// Draw data for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeView {
    pub from: Point,
    pub to: Point,
    pub hue_from: f32,
    pub hue_to: f32,
    pub intensity: u32,
    pub line_width: f32,
    pub orientation: Orientation,
}

/// Owned, serializable copy of a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameData {
    pub generation: u64,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

/// Borrowed, read-only view of the current grid.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'g> {
    grid: &'g Grid,
    generation: u64,
}

impl<'g> Snapshot<'g> {
    pub fn new(grid: &'g Grid, generation: u64) -> Self {
        Self { grid, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    pub fn nodes(self) -> impl Iterator<Item = NodeView> + 'g {
        let core_radius = self.grid.lattice().core_radius;
        self.grid.nodes().iter().map(move |n| node_view(n, core_radius))
    }

    pub fn edges(self) -> impl Iterator<Item = EdgeView> + 'g {
        let grid = self.grid;
        let core_radius = grid.lattice().core_radius;
        grid.edges().iter().filter_map(move |e| edge_view(grid, e, core_radius))
    }

    pub fn to_frame(&self) -> FrameData {
        let lattice = self.grid.lattice();
        FrameData {
            generation: self.generation,
            width: lattice.width,
            height: lattice.height,
            nodes: self.nodes().collect(),
            edges: self.edges().collect(),
        }
    }
}

fn node_view(node: &Node, core_radius: f32) -> NodeView {
    NodeView {
        position: node.position,
        hue: node.hue,
        intensity: node.intensity(),
        radius: (core_radius + node.energy as f32) / 2.0,
    }
}

fn edge_view(grid: &Grid, edge: &Edge, core_radius: f32) -> Option<EdgeView> {
    let a = grid.node(edge.a)?;
    let b = grid.node(edge.b)?;
    Some(EdgeView {
        from: a.position,
        to: b.position,
        hue_from: a.hue,
        hue_to: b.hue,
        intensity: edge.intensity(),
        line_width: (core_radius + edge.energy as f32) / 10.0,
        orientation: edge.orientation,
    })
}
