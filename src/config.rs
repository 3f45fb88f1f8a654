//! Simulation configuration.
//!
//! Every field has a default matching the stock neural grid visual, so a
//! JSON document only needs the keys it overrides:
//!
//! ```json
//! { "grid_size": 24, "energy": { "mode": "fixed", "max_energy": 20 }, "seed": 7 }
//! ```

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::{Error, Result};

// ============================================================================
// Energy policy
// ============================================================================

/// How the per-generation `max_energy` is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EnergyPolicy {
    /// Same charge regardless of viewport.
    Fixed { max_energy: u32 },
    /// `floor(x_step / divisor)`: wider cells hold longer-lived activation.
    CellScaled { divisor: f32 },
}

impl Default for EnergyPolicy {
    fn default() -> Self {
        EnergyPolicy::CellScaled { divisor: 4.0 }
    }
}

impl EnergyPolicy {
    /// Resolve the charge for a lattice with the given horizontal step.
    pub fn max_energy(&self, x_step: f32) -> u32 {
        match *self {
            EnergyPolicy::Fixed { max_energy } => max_energy,
            EnergyPolicy::CellScaled { divisor } => (x_step / divisor).floor().max(0.0) as u32,
        }
    }
}

// ============================================================================
// SimulationConfig
// ============================================================================

/// Largest accepted `hue_jitter`. Hues wrap at 360, so more adds nothing.
pub const MAX_HUE_JITTER: f32 = 180.0;

/// Tunables for building and running the activation network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Requested nodes per side; clamped to the viewport at build time.
    pub grid_size: usize,
    /// Smallest vertical cell spacing, in viewport units.
    pub min_cell_spacing: f32,
    pub base_hue: f32,
    /// Node hues are jittered uniformly within `±hue_jitter`.
    pub hue_jitter: f32,
    /// A horizontal pair is linked when `uniform(0, weight)` exceeds the
    /// pair's combined degree.
    pub horizontal_link_weight: f64,
    pub vertical_link_weight: f64,
    pub energy: EnergyPolicy,
    /// Ticks an activated node waits before firing its edges.
    pub fire_delay: u32,
    /// Times a node may be activated per generation. `None` is unlimited.
    pub max_activations_per_node: Option<u32>,
    /// Force a rebuild after this many ticks in one generation.
    pub max_generation_ticks: Option<u64>,
    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: 50,
            min_cell_spacing: 20.0,
            base_hue: 190.0,
            hue_jitter: 20.0,
            horizontal_link_weight: 4.0,
            vertical_link_weight: 5.0,
            energy: EnergyPolicy::default(),
            fire_delay: 1,
            max_activations_per_node: Some(2),
            max_generation_ticks: None,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_fixed_energy(mut self, max_energy: u32) -> Self {
        self.energy = EnergyPolicy::Fixed { max_energy };
        self
    }

    /// Reject settings that cannot describe a lattice.
    ///
    /// Small grid sizes and viewports are not errors; the builder clamps them.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_cell_spacing.is_finite() && self.min_cell_spacing > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "min_cell_spacing must be positive, got {}", self.min_cell_spacing
            )));
        }
        if !self.base_hue.is_finite() {
            return Err(Error::InvalidConfig("base_hue must be finite".into()));
        }
        if !(0.0..=MAX_HUE_JITTER).contains(&self.hue_jitter) {
            return Err(Error::InvalidConfig(format!(
                "hue_jitter must be within 0..={MAX_HUE_JITTER}, got {}", self.hue_jitter
            )));
        }
        for (name, weight) in [
            ("horizontal_link_weight", self.horizontal_link_weight),
            ("vertical_link_weight", self.vertical_link_weight),
        ] {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be non-negative, got {weight}")));
            }
        }
        match self.energy {
            EnergyPolicy::Fixed { max_energy: 0 } => {
                return Err(Error::InvalidConfig("fixed max_energy must be at least 1".into()));
            }
            EnergyPolicy::CellScaled { divisor } if !(divisor.is_finite() && divisor > 0.0) => {
                return Err(Error::InvalidConfig(format!("energy divisor must be positive, got {divisor}")));
            }
            _ => {}
        }
        if self.max_activations_per_node == Some(0) {
            return Err(Error::InvalidConfig("max_activations_per_node must be at least 1".into()));
        }
        if self.max_generation_ticks == Some(0) {
            return Err(Error::InvalidConfig("max_generation_ticks must be at least 1".into()));
        }
        Ok(())
    }
}
