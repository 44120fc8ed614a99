//! World simulation engine.
//!
//! This crate implements the toroidal grass grid, the rabbits that graze on it,
//! the population bookkeeping around them, and the tick loop that drives it all.

pub mod world;
pub mod agent;
pub mod population;
pub mod engine;

pub use world::World;
pub use agent::{Agent, StepOutcome};
pub use population::{Population, StepSummary};
pub use engine::Engine;
