//! Headless command-line driver for the tetra simulation.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Range;
use std::path::PathBuf;
use tetra_core::{SimConfig, World};
use tracing::info;

#[derive(Parser)]
#[command(name = "tetra")]
#[command(version, about = "Tetra schooling simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one seeded simulation and print its summary as JSON
    Run {
        #[command(flatten)]
        sim: SimArgs,

        /// Pretty-print the summary
        #[arg(long)]
        pretty: bool,
    },

    /// Run a range of seeds in parallel, one summary line per seed
    Batch {
        #[command(flatten)]
        sim: SimArgs,

        /// Half-open seed range, e.g. "0..16"
        #[arg(long, default_value = "0..8")]
        seeds: String,
    },

    /// Print the default configuration as JSON
    Config,
}

#[derive(clap::Args, Clone)]
struct SimArgs {
    /// JSON config file; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to run
    #[arg(short, long, default_value = "3600")]
    ticks: usize,

    /// Collect metrics every N ticks
    #[arg(long, default_value = "60")]
    sample_every: usize,

    /// Number of agents (overrides the config file)
    #[arg(short, long)]
    population: Option<usize>,

    /// Surface size as WIDTHxHEIGHT (overrides the config file)
    #[arg(long)]
    surface: Option<String>,

    /// Separate overlapping swimmers after every tick
    #[arg(long)]
    resolve_overlaps: bool,
}

impl SimArgs {
    fn load_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                SimConfig::from_json(&text)
                    .with_context(|| format!("invalid config in {}", path.display()))?
            }
            None => SimConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(population) = self.population {
            config.population = population;
        }
        if let Some(surface) = &self.surface {
            let (width, height) = parse_surface(surface)?;
            config.surface_width = width;
            config.surface_height = height;
        }
        if self.resolve_overlaps {
            config.resolve_overlaps = true;
        }
        config.validate().context("invalid simulation config")?;
        Ok(config)
    }
}

#[derive(Serialize)]
struct BatchLine {
    seed: u64,
    ticks: usize,
    final_alive_count: usize,
    total_deaths: usize,
    last_death_tick: Option<u64>,
    final_hunger_mean: f64,
}

fn parse_surface(text: &str) -> Result<(f64, f64)> {
    let Some((w, h)) = text.split_once(['x', 'X']) else {
        bail!("surface must look like WIDTHxHEIGHT, got {text:?}");
    };
    let width: f64 = w.trim().parse().with_context(|| format!("bad width {w:?}"))?;
    let height: f64 = h.trim().parse().with_context(|| format!("bad height {h:?}"))?;
    Ok((width, height))
}

fn parse_seed_range(text: &str) -> Result<Range<u64>> {
    let Some((start, end)) = text.split_once("..") else {
        bail!("seed range must look like START..END, got {text:?}");
    };
    let start: u64 = start.trim().parse().context("bad range start")?;
    let end: u64 = end.trim().parse().context("bad range end")?;
    if end <= start {
        bail!("seed range {text:?} is empty");
    }
    Ok(start..end)
}

fn run(sim: &SimArgs, pretty: bool) -> Result<()> {
    let config = sim.load_config()?;
    let mut world = World::try_new(config).context("failed to build world")?;
    let summary = world
        .try_run_experiment(sim.ticks, sim.sample_every)
        .context("failed to run experiment")?;
    info!(
        seed = summary.seed,
        final_alive = summary.final_alive_count,
        deaths = summary.deaths.len(),
        "run finished"
    );
    let json = if pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{json}");
    Ok(())
}

fn batch(sim: &SimArgs, seeds: &str) -> Result<()> {
    let base = sim.load_config()?;
    let seeds: Vec<u64> = parse_seed_range(seeds)?.collect();
    info!(runs = seeds.len(), ticks = sim.ticks, "starting batch");

    let lines: Vec<BatchLine> = seeds
        .par_iter()
        .map(|&seed| -> Result<BatchLine> {
            let config = SimConfig { seed, ..base.clone() };
            let mut world = World::try_new(config)?;
            let summary = world.try_run_experiment(sim.ticks, sim.sample_every)?;
            Ok(BatchLine {
                seed,
                ticks: summary.ticks,
                final_alive_count: summary.final_alive_count,
                total_deaths: world.total_deaths(),
                last_death_tick: summary.deaths.last().map(|d| d.tick),
                final_hunger_mean: world.population_stats().mean_hunger,
            })
        })
        .collect::<Result<_>>()?;

    for line in &lines {
        println!("{}", serde_json::to_string(line)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { sim, pretty } => run(&sim, pretty),
        Commands::Batch { sim, seeds } => batch(&sim, &seeds),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&SimConfig::default())?);
            Ok(())
        }
    }
}
