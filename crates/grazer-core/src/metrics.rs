//! Aggregate statistics the engine exposes to hosts after each tick.

use crate::{AgentId, Position};
use serde::{Deserialize, Serialize};

/// Where a living agent sits, for spatial rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPlacement {
    pub id: AgentId,
    pub x: i32,
    pub y: i32,
}

impl AgentPlacement {
    pub fn new(id: AgentId, position: Position) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// End-of-tick snapshot. Agent sequences are ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickMetrics {
    /// Ticks completed so far (0 before the first tick)
    pub tick: u64,
    /// Sum of grass over all cells
    pub total_grass: u64,
    /// Agents alive at the end of the tick
    pub living_agents: usize,
    /// Offspring that found a cell during this tick
    pub births: usize,
    /// Agents reaped during this tick
    pub deaths: usize,
    /// Birth requests that found no free cell during this tick
    pub spawn_failures: usize,
    /// Energy of every living agent, for histogramming
    pub agent_energies: Vec<i32>,
    /// Position of every living agent
    pub agent_positions: Vec<AgentPlacement>,
}

impl TickMetrics {
    pub fn mean_energy(&self) -> Option<f64> {
        if self.agent_energies.is_empty() {
            return None;
        }
        let sum: i64 = self.agent_energies.iter().map(|e| *e as i64).sum();
        Some(sum as f64 / self.agent_energies.len() as f64)
    }
}

/// Cumulative counters over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub total_births: u64,
    pub total_deaths: u64,
    pub total_spawn_failures: u64,
    pub peak_population: usize,
    pub final_population: usize,
    pub final_grass: u64,
}

impl RunSummary {
    /// Fold one tick's metrics into the running totals
    pub fn record(&mut self, metrics: &TickMetrics) {
        self.ticks = metrics.tick;
        self.total_births += metrics.births as u64;
        self.total_deaths += metrics.deaths as u64;
        self.total_spawn_failures += metrics.spawn_failures as u64;
        self.peak_population = self.peak_population.max(metrics.living_agents);
        self.final_population = metrics.living_agents;
        self.final_grass = metrics.total_grass;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_energy() {
        let mut metrics = TickMetrics::default();
        assert_eq!(metrics.mean_energy(), None);

        metrics.agent_energies = vec![10, 20, 30];
        assert_eq!(metrics.mean_energy(), Some(20.0));
    }

    #[test]
    fn test_summary_record() {
        let mut summary = RunSummary::default();

        summary.record(&TickMetrics {
            tick: 1,
            total_grass: 40,
            living_agents: 12,
            births: 3,
            deaths: 1,
            ..Default::default()
        });
        summary.record(&TickMetrics {
            tick: 2,
            total_grass: 35,
            living_agents: 9,
            births: 0,
            deaths: 3,
            spawn_failures: 2,
            ..Default::default()
        });

        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.total_births, 3);
        assert_eq!(summary.total_deaths, 4);
        assert_eq!(summary.total_spawn_failures, 2);
        assert_eq!(summary.peak_population, 12);
        assert_eq!(summary.final_population, 9);
        assert_eq!(summary.final_grass, 35);
    }

    #[test]
    fn test_placement_position() {
        let placement = AgentPlacement::new(AgentId(4), Position::new(2, 7));
        assert_eq!(placement.position(), Position::new(2, 7));
        assert_eq!(placement.id, AgentId(4));
    }
}
