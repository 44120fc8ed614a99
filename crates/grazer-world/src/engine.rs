//! Tick orchestration: step everyone, reap the dead, regrow the grass.

use crate::population::Population;
use crate::world::World;
use grazer_core::{
    AgentPlacement, Result, RunSummary, SimulationConfig, SpawnFailure, TickMetrics,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, event, info, instrument, Level};

/// How often the population snapshot is logged
const METRICS_LOG_INTERVAL: u64 = 10;

/// Owns one simulation run: the world, its population, and the random source.
///
/// The engine has no stopping condition of its own; the host calls
/// [`Engine::tick`] as often as it likes and reads metrics between calls.
pub struct Engine<R = ChaCha8Rng> {
    config: SimulationConfig,
    world: World,
    population: Population,
    rng: R,
    tick: u64,
    metrics: TickMetrics,
    summary: RunSummary,
}

impl Engine<ChaCha8Rng> {
    /// Build a run driven by a ChaCha8 generator seeded from `seed`
    pub fn seeded(config: SimulationConfig, seed: u64) -> Result<Self> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    /// Validate the configuration, then spread the initial grass and seed the rabbits.
    #[instrument(skip(config, rng), fields(width = config.grid_width, height = config.grid_height))]
    pub fn new(config: SimulationConfig, mut rng: R) -> Result<Self> {
        config.validate()?;

        let (world, population, seeded) = build_run(&config, &mut rng)?;

        let mut engine = Self {
            config,
            world,
            population,
            rng,
            tick: 0,
            metrics: TickMetrics::default(),
            summary: RunSummary::default(),
        };
        engine.refresh_metrics(0, 0, seeded.failures);
        engine.summary.record(&engine.metrics);

        info!(
            event = "run_built",
            rabbits = engine.population.living_count(),
            requested_rabbits = engine.config.initial_rabbit_count,
            total_grass = engine.world.total_grass(),
            "Simulation ready"
        );
        for agent in engine.population.iter() {
            debug!("{}", agent.report());
        }

        Ok(engine)
    }

    /// Advance the simulation by one tick and return the end-of-tick snapshot
    pub fn tick(&mut self) -> &TickMetrics {
        self.tick += 1;

        let stepped = self
            .population
            .step_all(&mut self.world, &self.config, self.tick, &mut self.rng);
        let deaths = self.population.reap(&mut self.world, self.tick);
        let grown = self
            .world
            .spread_grass(self.config.grass_growth_rate as u32, &mut self.rng);

        self.refresh_metrics(stepped.births, deaths, stepped.spawn_failures);
        self.summary.record(&self.metrics);

        debug!(
            tick = self.tick,
            stepped = stepped.stepped,
            moves = stepped.moves,
            harvested = stepped.harvested,
            grass_grown = grown,
            "Tick complete"
        );

        if self.tick % METRICS_LOG_INTERVAL == 0 {
            self.emit_population_metrics();
        }

        &self.metrics
    }

    /// Run `ticks` ticks back to back, returning the last snapshot
    pub fn run_for(&mut self, ticks: u64) -> &TickMetrics {
        for _ in 0..ticks {
            self.tick();
        }
        &self.metrics
    }

    /// Replace the configuration and start a fresh run from tick 0.
    ///
    /// An invalid configuration is rejected and the current run is left as it was.
    #[instrument(skip(self, config))]
    pub fn reconfigure(&mut self, config: SimulationConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.reset()
    }

    /// Throw away the current run and rebuild it from the current configuration
    pub fn reset(&mut self) -> Result<()> {
        let (world, population, seeded) = build_run(&self.config, &mut self.rng)?;
        self.world = world;
        self.population = population;
        self.tick = 0;
        self.summary = RunSummary::default();
        self.refresh_metrics(0, 0, seeded.failures);
        self.summary.record(&self.metrics);

        info!(
            event = "run_reset",
            rabbits = self.population.living_count(),
            total_grass = self.world.total_grass(),
            "Simulation reset"
        );
        Ok(())
    }

    pub fn total_grass(&self) -> u64 {
        self.metrics.total_grass
    }

    pub fn living_agent_count(&self) -> usize {
        self.metrics.living_agents
    }

    pub fn agent_energies(&self) -> &[i32] {
        &self.metrics.agent_energies
    }

    pub fn agent_positions(&self) -> &[AgentPlacement] {
        &self.metrics.agent_positions
    }

    /// Snapshot taken at the end of the last tick (or at construction)
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Ticks completed in the current run
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    fn refresh_metrics(&mut self, births: usize, deaths: usize, spawn_failures: usize) {
        self.metrics = TickMetrics {
            tick: self.tick,
            total_grass: self.world.total_grass(),
            living_agents: self.population.living_count(),
            births,
            deaths,
            spawn_failures,
            agent_energies: self.population.energies(),
            agent_positions: self.population.positions(),
        };
    }

    fn emit_population_metrics(&self) {
        let energies = &self.metrics.agent_energies;
        let max_energy = energies.iter().max().copied().unwrap_or(0);
        let min_energy = energies.iter().min().copied().unwrap_or(0);
        let avg_energy = self.metrics.mean_energy().unwrap_or(0.0);

        info!(
            event = "population_metrics",
            tick = self.tick,
            living_agents = self.metrics.living_agents,
            total_grass = self.metrics.total_grass,
            avg_energy = format!("{:.1}", avg_energy),
            max_energy = max_energy,
            min_energy = min_energy,
            total_births = self.summary.total_births,
            total_deaths = self.summary.total_deaths,
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_total",
            gauge_value = self.metrics.living_agents,
            tick = self.tick,
            "Population gauge"
        );

        event!(
            Level::INFO,
            gauge_name = "grass_total",
            gauge_value = self.metrics.total_grass,
            tick = self.tick,
            "Grass gauge"
        );
    }
}

struct Seeding {
    failures: usize,
}

/// Fresh world with its initial grass, then the initial rabbits on top
fn build_run<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<(World, Population, Seeding)> {
    let mut world = World::from_config(config)?;
    world.spread_grass(config.initial_grass_units as u32, rng);

    let mut population = Population::new();
    let requested = config.initial_rabbit_count.max(0) as usize;
    let mut failures = 0;
    for placed in 0..requested {
        // Once the grid is full every remaining request fails; burn their ids in one go.
        if world.occupied_count() == world.area() {
            let remaining = requested - placed;
            population.forfeit_ids(remaining as u64);
            failures += remaining;
            break;
        }
        if let Err(SpawnFailure::NoSpace) = population.spawn(&mut world, config, 0, rng) {
            failures += 1;
        }
    }

    if failures > 0 {
        info!(
            event = "seeding_capped",
            requested = config.initial_rabbit_count,
            placed = population.living_count(),
            "Grid too small for every initial rabbit"
        );
    }

    Ok((world, population, Seeding { failures }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grazer_core::{Error, Position};

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            grid_width: 12,
            grid_height: 10,
            initial_rabbit_count: 15,
            initial_grass_units: 300,
            grass_growth_rate: 40,
            birth_threshold: 200,
            rabbit_min_init_energy: 50,
            rabbit_max_init_energy: 100,
            rabbit_energy_loss_rate: 5,
            energy_per_grass_unit: 10,
            grass_cap: Some(31),
            ..Default::default()
        }
    }

    fn assert_consistent<R: Rng>(engine: &Engine<R>) {
        let world = engine.world();
        let population = engine.population();

        assert_eq!(population.living_count(), world.occupied_count());
        assert_eq!(engine.living_agent_count(), population.living_count());
        for agent in population.iter() {
            assert!(agent.is_alive());
            assert_eq!(world.occupant(agent.position), Some(agent.id));
        }
        if let Some(cap) = world.grass_cap() {
            assert!(world.grass_cells().iter().all(|g| *g <= cap));
        }
        assert_eq!(engine.total_grass(), world.total_grass());
    }

    #[test]
    fn test_engine_creation() {
        let engine = Engine::seeded(small_config(), 42).unwrap();

        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.living_agent_count(), 15);
        assert_eq!(engine.total_grass(), 300);
        assert_eq!(engine.agent_energies().len(), 15);
        assert_eq!(engine.agent_positions().len(), 15);
        assert_consistent(&engine);
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = SimulationConfig {
            grid_width: 0,
            ..small_config()
        };
        assert!(matches!(
            Engine::seeded(config, 1),
            Err(Error::InvalidConfig(_))
        ));

        let config = SimulationConfig {
            rabbit_min_init_energy: 200,
            rabbit_max_init_energy: 100,
            ..small_config()
        };
        assert!(Engine::seeded(config, 1).is_err());
    }

    #[test]
    fn test_ticks_keep_world_consistent() {
        let mut engine = Engine::seeded(small_config(), 7).unwrap();

        for expected_tick in 1..=60 {
            let metrics = engine.tick().clone();
            assert_eq!(metrics.tick, expected_tick);
            assert_eq!(metrics.living_agents, metrics.agent_positions.len());
            assert_eq!(metrics.living_agents, metrics.agent_energies.len());
            assert_consistent(&engine);
        }
    }

    #[test]
    fn test_seeding_is_capped_by_grid_area() {
        let config = SimulationConfig {
            grid_width: 3,
            grid_height: 3,
            initial_rabbit_count: 20,
            ..small_config()
        };
        let engine = Engine::seeded(config, 5).unwrap();

        assert_eq!(engine.living_agent_count(), 9);
        assert_eq!(engine.metrics().spawn_failures, 11);
        assert_eq!(engine.population().next_id().get(), 20);
    }

    #[test]
    fn test_oversized_seeding_stops_scanning_once_full() {
        let config = SimulationConfig {
            grid_width: 3,
            grid_height: 3,
            initial_rabbit_count: i32::MAX,
            ..small_config()
        };
        let engine = Engine::seeded(config, 5).unwrap();

        assert_eq!(engine.living_agent_count(), 9);
        assert_eq!(engine.metrics().spawn_failures, i32::MAX as usize - 9);
        assert_eq!(engine.population().next_id().get(), i32::MAX as u64);
        assert_consistent(&engine);
    }

    #[test]
    fn test_same_seed_same_history() {
        let mut a = Engine::seeded(small_config(), 99).unwrap();
        let mut b = Engine::seeded(small_config(), 99).unwrap();

        for _ in 0..40 {
            assert_eq!(a.tick(), b.tick());
        }
    }

    #[test]
    fn test_metrics_match_state_after_tick() {
        let mut engine = Engine::seeded(small_config(), 3).unwrap();
        engine.run_for(5);

        let energies: Vec<i32> = engine.population().iter().map(|a| a.energy).collect();
        assert_eq!(engine.agent_energies(), energies.as_slice());

        let positions: Vec<Position> = engine.agent_positions().iter().map(|p| p.position()).collect();
        let expected: Vec<Position> = engine.population().iter().map(|a| a.position).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn test_summary_tracks_births_and_deaths() {
        let mut engine = Engine::seeded(small_config(), 12).unwrap();
        let mut births = 0;
        let mut deaths = 0;
        let mut peak = engine.living_agent_count();

        for _ in 0..50 {
            let metrics = engine.tick();
            births += metrics.births as u64;
            deaths += metrics.deaths as u64;
            peak = peak.max(metrics.living_agents);
        }

        let summary = engine.summary();
        assert_eq!(summary.ticks, 50);
        assert_eq!(summary.total_births, births);
        assert_eq!(summary.total_deaths, deaths);
        assert_eq!(summary.peak_population, peak);
        assert_eq!(summary.final_population, engine.living_agent_count());
        assert_eq!(
            engine.living_agent_count() as u64,
            15 + births - deaths
        );
    }

    #[test]
    fn test_reconfigure_resets_run() {
        let mut engine = Engine::seeded(small_config(), 8).unwrap();
        engine.run_for(10);
        assert_eq!(engine.tick_count(), 10);

        let config = SimulationConfig {
            grid_width: 6,
            grid_height: 6,
            initial_rabbit_count: 4,
            initial_grass_units: 20,
            ..small_config()
        };
        engine.reconfigure(config.clone()).unwrap();

        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.config(), &config);
        assert_eq!(engine.world().area(), 36);
        assert_eq!(engine.living_agent_count(), 4);
        assert_eq!(engine.population().next_id().get(), 4);
        assert_eq!(engine.summary().total_births, 0);
        assert_consistent(&engine);
    }

    #[test]
    fn test_rejected_reconfigure_keeps_run() {
        let mut engine = Engine::seeded(small_config(), 8).unwrap();
        engine.run_for(3);
        let before = engine.metrics().clone();

        let bad = SimulationConfig {
            birth_threshold: -1,
            ..small_config()
        };
        assert!(engine.reconfigure(bad).is_err());

        assert_eq!(engine.tick_count(), 3);
        assert_eq!(engine.metrics(), &before);
        assert_eq!(engine.config(), &small_config());
    }
}
