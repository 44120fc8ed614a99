//! Rabbit state and per-tick behaviour.

use crate::world::World;
use grazer_core::{AgentId, Direction, Position, SimulationConfig};
use rand::Rng;
use tracing::trace;

/// A rabbit in the simulation.
///
/// Alive while `energy > 0`. Energy may dip to zero or below during a tick;
/// the population reaps such agents at the end of the tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    pub position: Position,
    pub energy: i32,
    pub age: u64,
    pub birth_tick: u64,
}

/// What happened during one agent step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub moved: bool,
    pub harvested: u32,
    pub birth_requested: bool,
}

impl Agent {
    pub fn new(id: AgentId, position: Position, energy: i32, birth_tick: u64) -> Self {
        Self {
            id,
            position,
            energy,
            age: 0,
            birth_tick,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    pub fn add_energy(&mut self, amount: i32) {
        self.energy = self.energy.saturating_add(amount);
    }

    pub fn lose_energy(&mut self, amount: i32) {
        self.energy = self.energy.saturating_sub(amount);
    }

    /// Try to move one cell in `direction`. A taken destination leaves the agent in place.
    pub fn try_move(&mut self, world: &mut World, direction: Direction) -> bool {
        let target = self.position.step(direction, world.width(), world.height());
        if world.move_agent(self.position, target) {
            self.position = target;
            true
        } else {
            trace!(agent_id = %self.id, from = %self.position, to = %target, "Move contested");
            false
        }
    }

    /// One tick of rabbit behaviour: wander, graze, maybe breed, burn energy.
    ///
    /// A birth request is only reported here; the caller decides where the
    /// offspring goes. Reproducing resets energy to half the birth threshold
    /// before the regular loss is applied.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        let direction = Direction::random(rng);
        outcome.moved = self.try_move(world, direction);

        outcome.harvested = world.eat_grass_at(self.position);
        let gained = (outcome.harvested.min(i32::MAX as u32) as i32)
            .saturating_mul(config.energy_per_grass_unit);
        self.add_energy(gained);

        if self.energy >= config.birth_threshold {
            outcome.birth_requested = true;
            self.energy = config.birth_threshold / 2;
        }

        self.lose_energy(config.rabbit_energy_loss_rate);
        self.age += 1;

        outcome
    }

    /// Human-readable one-line status
    pub fn report(&self) -> String {
        format!("{} at {} has {} energy", self.id, self.position, self.energy)
    }
}
