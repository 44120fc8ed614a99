//! Host driver: owns an engine, decides how many ticks to run, and reports metrics.

use anyhow::{Context, Result};
use grazer_core::{RunConfig, RunSummary};
use grazer_world::Engine;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

pub struct Driver {
    config: RunConfig,
    engine: Engine,
}

impl Driver {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let engine = Engine::seeded(config.simulation.clone(), config.seed)?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run every configured tick, writing one JSON metrics line per report interval.
    ///
    /// The initial state (tick 0) and the final tick are always written.
    #[instrument(skip(self, out), fields(seed = self.config.seed, num_ticks = self.config.num_ticks))]
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        info!("Starting simulation for {} ticks", self.config.num_ticks);
        let start = Instant::now();

        write_metrics_line(out, &self.engine)?;

        for tick in 1..=self.config.num_ticks {
            self.engine.tick();

            if tick % self.config.report_interval == 0 || tick == self.config.num_ticks {
                write_metrics_line(out, &self.engine)?;
            }
        }
        out.flush()?;

        let summary = self.engine.summary().clone();
        emit_run_summary(&summary, start.elapsed().as_secs_f64());

        Ok(summary)
    }
}

/// Read a run configuration from a JSON file, or fall back to the defaults
pub fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(path) => {
            let config = RunConfig::from_path(path)
                .with_context(|| format!("loading config file {}", path.display()))?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => {
            info!("No config file given, using defaults");
            Ok(RunConfig::default())
        }
    }
}

fn write_metrics_line<W: Write>(out: &mut W, engine: &Engine) -> Result<()> {
    serde_json::to_writer(&mut *out, engine.metrics())?;
    out.write_all(b"\n")?;
    Ok(())
}

fn emit_run_summary(summary: &RunSummary, elapsed_secs: f64) {
    info!(
        event = "run_summary",
        ticks = summary.ticks,
        total_births = summary.total_births,
        total_deaths = summary.total_deaths,
        total_spawn_failures = summary.total_spawn_failures,
        peak_population = summary.peak_population,
        final_population = summary.final_population,
        final_grass = summary.final_grass,
        elapsed = format!("{:.2}s", elapsed_secs),
        "🏁 Run complete"
    );

    if summary.final_population == 0 {
        info!(event = "extinction", "⚠️ No rabbits left at the end of the run");
    }
}
