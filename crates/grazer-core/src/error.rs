//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Why a spawn request produced no live agent.
///
/// This is an expected outcome under crowding, not a fault.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnFailure {
    #[error("no free cell available for a new agent")]
    NoSpace,
}
