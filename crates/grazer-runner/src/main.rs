//! Command-line host for the rabbits-and-grass simulation.
//!
//! Usage: `grazer-runner [config.json]`. Metrics go to stdout as JSON lines,
//! logs go to stderr.

mod driver;
mod telemetry;

use anyhow::Result;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = driver::load_config(config_path.as_deref())?;

    info!(
        seed = config.seed,
        width = config.simulation.grid_width,
        height = config.simulation.grid_height,
        "Starting Grazer runner"
    );

    let mut driver = driver::Driver::new(config)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    driver.run(&mut out)?;

    info!(
        ticks = driver.config().num_ticks,
        living = driver.engine().living_agent_count(),
        "Shutting down runner"
    );
    Ok(())
}
