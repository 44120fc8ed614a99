//! The authoritative set of living agents and their birth/death bookkeeping.

use crate::agent::Agent;
use crate::world::World;
use grazer_core::{AgentId, AgentPlacement, SimulationConfig, SpawnFailure};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// Counts gathered while stepping every agent once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSummary {
    pub stepped: usize,
    pub moves: usize,
    pub harvested: u64,
    pub births: usize,
    pub spawn_failures: usize,
}

/// Living agents keyed by id.
///
/// Ids come from a counter owned here; a fresh population starts at zero and
/// never hands out the same id twice. Iteration order is id order, which is
/// also insertion order.
#[derive(Debug, Clone, Default)]
pub struct Population {
    agents: BTreeMap<AgentId, Agent>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one agent on a random free cell.
    ///
    /// The id is consumed even when no cell is free. A full grid fails
    /// straight away without searching.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        config: &SimulationConfig,
        tick: u64,
        rng: &mut R,
    ) -> Result<AgentId, SpawnFailure> {
        let id = AgentId(self.next_id);
        self.next_id += 1;

        let found = if world.occupied_count() < world.area() {
            let energy = initial_energy(config, rng);
            world
                .find_free_cell(config.placement, rng)
                .map(|position| (position, energy))
        } else {
            None
        };

        let (position, energy) = match found {
            Some(found) => found,
            None => {
                debug!(
                    event = "spawn_failed",
                    agent_id = %id,
                    tick = tick,
                    population = self.agents.len(),
                    "No free cell for new agent"
                );
                return Err(SpawnFailure::NoSpace);
            }
        };

        if !world.place_agent(id, position) {
            return Err(SpawnFailure::NoSpace);
        }
        self.agents.insert(id, Agent::new(id, position, energy, tick));

        Ok(id)
    }

    /// Step every agent once in a fresh random order.
    ///
    /// Only agents alive when the pass starts are stepped. Offspring are placed
    /// as soon as they are requested but wait until the next pass to act.
    pub fn step_all<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        config: &SimulationConfig,
        tick: u64,
        rng: &mut R,
    ) -> StepSummary {
        let order = self.stepping_order(rng);
        let mut summary = StepSummary::default();

        for id in order {
            let outcome = match self.agents.get_mut(&id) {
                Some(agent) => agent.step(world, config, rng),
                None => continue,
            };

            summary.stepped += 1;
            summary.harvested += outcome.harvested as u64;
            if outcome.moved {
                summary.moves += 1;
            }

            if outcome.birth_requested {
                match self.spawn(world, config, tick, rng) {
                    Ok(child) => {
                        summary.births += 1;
                        debug!(
                            event = "birth",
                            parent_id = %id,
                            offspring_id = %child,
                            tick = tick,
                            "Rabbit reproduced"
                        );
                    }
                    Err(SpawnFailure::NoSpace) => summary.spawn_failures += 1,
                }
            }
        }

        summary
    }

    /// Living agents in a fresh uniform random order
    fn stepping_order<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<AgentId> {
        let mut order: Vec<AgentId> = self
            .agents
            .values()
            .filter(|agent| agent.is_alive())
            .map(|agent| agent.id)
            .collect();
        order.shuffle(rng);
        order
    }

    /// Remove every agent with no energy left and free its cell
    pub fn reap(&mut self, world: &mut World, tick: u64) -> usize {
        let dead: Vec<AgentId> = self
            .agents
            .values()
            .filter(|agent| !agent.is_alive())
            .map(|agent| agent.id)
            .collect();

        for id in &dead {
            if let Some(agent) = self.agents.remove(id) {
                world.remove_agent_at(agent.position);
                debug!(
                    event = "death",
                    agent_id = %id,
                    tick = tick,
                    birth_tick = agent.birth_tick,
                    age = agent.age,
                    final_energy = agent.energy,
                    "Rabbit died"
                );
            }
        }

        dead.len()
    }

    pub fn living_count(&self) -> usize {
        self.agents.len()
    }

    /// Consume `count` ids without creating agents, as if that many spawns had failed
    pub fn forfeit_ids(&mut self, count: u64) {
        self.next_id += count;
    }

    /// The id the next spawn will use
    pub fn next_id(&self) -> AgentId {
        AgentId(self.next_id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Agents in id order
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    /// Energy of each agent, in id order
    pub fn energies(&self) -> Vec<i32> {
        self.agents.values().map(|agent| agent.energy).collect()
    }

    /// Position of each agent, in id order
    pub fn positions(&self) -> Vec<AgentPlacement> {
        self.agents
            .values()
            .map(|agent| AgentPlacement::new(agent.id, agent.position))
            .collect()
    }

    /// Status line for one agent
    pub fn report(&self, id: AgentId) -> Option<String> {
        self.agents.get(&id).map(Agent::report)
    }
}

fn initial_energy<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> i32 {
    if config.rabbit_min_init_energy < config.rabbit_max_init_energy {
        rng.gen_range(config.rabbit_min_init_energy..config.rabbit_max_init_energy)
    } else {
        config.rabbit_min_init_energy
    }
}
