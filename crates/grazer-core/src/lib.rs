//! Core types and utilities for the Grazer rabbits-and-grass simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod metrics;

pub use error::{Error, Result, SpawnFailure};
pub use types::*;
pub use config::*;
pub use metrics::*;
