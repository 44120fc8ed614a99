//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a free cell is chosen when placing a new agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Enumerate every free cell and pick one uniformly. Never misses a free cell.
    Exhaustive,
    /// Probe up to `max_attempts` random cells.
    ///
    /// Cheaper on large, sparse grids, but may report no space on a nearly
    /// full grid even though a free cell exists.
    Sampled { max_attempts: u32 },
}

impl Default for PlacementStrategy {
    fn default() -> Self {
        PlacementStrategy::Exhaustive
    }
}

/// Tunables for one simulation run, validated before a run is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Width of the world grid
    pub grid_width: i32,
    /// Height of the world grid
    pub grid_height: i32,
    /// Rabbits seeded when the run is built
    pub initial_rabbit_count: i32,
    /// Grass units spread when the run is built
    pub initial_grass_units: i32,
    /// Grass units spread at the end of every tick
    pub grass_growth_rate: i32,
    /// Energy at which a rabbit reproduces
    pub birth_threshold: i32,
    /// Lower bound (inclusive) of a newborn's energy
    pub rabbit_min_init_energy: i32,
    /// Upper bound (exclusive) of a newborn's energy
    pub rabbit_max_init_energy: i32,
    /// Energy every rabbit loses per tick
    pub rabbit_energy_loss_rate: i32,
    /// Energy gained per grass unit eaten
    pub energy_per_grass_unit: i32,
    /// Maximum grass units per cell; `None` means uncapped
    pub grass_cap: Option<i32>,
    /// Free-cell search used for spawning
    pub placement: PlacementStrategy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_rabbit_count: 50,
            initial_grass_units: 1000,
            grass_growth_rate: 100,
            birth_threshold: 10_000,
            rabbit_min_init_energy: 500,
            rabbit_max_init_energy: 1000,
            rabbit_energy_loss_rate: 25,
            energy_per_grass_unit: 50,
            grass_cap: None,
            placement: PlacementStrategy::Exhaustive,
        }
    }
}

impl SimulationConfig {
    /// Reject any configuration a run cannot safely start from
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("grid_width", self.grid_width),
            ("grid_height", self.grid_height),
            ("initial_rabbit_count", self.initial_rabbit_count),
            ("initial_grass_units", self.initial_grass_units),
            ("grass_growth_rate", self.grass_growth_rate),
            ("birth_threshold", self.birth_threshold),
            ("rabbit_min_init_energy", self.rabbit_min_init_energy),
            ("rabbit_max_init_energy", self.rabbit_max_init_energy),
            ("rabbit_energy_loss_rate", self.rabbit_energy_loss_rate),
            ("energy_per_grass_unit", self.energy_per_grass_unit),
        ];

        for (name, value) in positive {
            if value <= 0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if let Some(cap) = self.grass_cap {
            if cap <= 0 {
                return Err(Error::InvalidConfig(format!(
                    "grass_cap must be positive when set, got {}",
                    cap
                )));
            }
        }

        if self.rabbit_min_init_energy > self.rabbit_max_init_energy {
            return Err(Error::InvalidConfig(format!(
                "rabbit_min_init_energy ({}) exceeds rabbit_max_init_energy ({})",
                self.rabbit_min_init_energy, self.rabbit_max_init_energy
            )));
        }

        let area = self.grid_width as i64 * self.grid_height as i64;
        if area > i32::MAX as i64 {
            return Err(Error::InvalidConfig(format!(
                "grid of {}x{} cells is too large",
                self.grid_width, self.grid_height
            )));
        }

        if let PlacementStrategy::Sampled { max_attempts: 0 } = self.placement {
            return Err(Error::InvalidConfig(
                "sampled placement needs at least one attempt".to_string(),
            ));
        }

        Ok(())
    }
}

/// Host driver configuration: which simulation to build and how long to run it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulation tunables
    pub simulation: SimulationConfig,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of ticks to run
    pub num_ticks: u64,
    /// Emit a metrics line every this many ticks
    pub report_interval: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            seed: 0,
            num_ticks: 1_000,
            report_interval: 10,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        if self.report_interval == 0 {
            return Err(Error::InvalidConfig(
                "report_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a run configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON run configuration file
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
