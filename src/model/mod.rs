//! # Activation Network Model
//!
//! Plain data for one generation of the lattice: nodes, edges and the grid
//! arena that owns them. Cross references are index handles, never
//! pointers, so the whole generation can be dropped and replaced in one
//! assignment.
//!
//! This module is pure data: no randomness, no logging, no clock.

pub mod node;
pub mod edge;
pub mod grid;

pub use node::{Node, NodeId};
pub use edge::{Edge, EdgeId, Orientation};
pub use grid::{MAX_ENERGY_CEILING, EnergyProfile, Grid, GridPos, Lattice, Point};
