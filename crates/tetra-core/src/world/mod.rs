pub mod metrics;

pub use metrics::*;

use crate::agent::{Agent, AgentId, Peers, StepOutcome, StepParams};
use crate::collision;
use crate::config::{SimConfig, SimConfigError, SwimZone};
use crate::rng::RandomSource;
use crate::snapshot::{AgentSnapshot, Connection};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};
use tracing::{debug, info, trace};

/// Owns the swim zone and every agent ever created, in creation order.
///
/// Agents are addressed by index: `agents[i].id == i` always holds.
pub struct World<R = ChaCha12Rng> {
    agents: Vec<Agent>,
    config: SimConfig,
    zone: SwimZone,
    params: StepParams,
    rng: R,
    show_connections: bool,
    tick_index: u64,
    deaths_last_tick: usize,
    total_deaths: usize,
    death_events: Vec<DeathEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldInitError {
    Config(SimConfigError),
    AgentIdMismatch { index: usize, id: AgentId },
}

impl fmt::Display for WorldInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldInitError::Config(e) => write!(f, "{}", e),
            WorldInitError::AgentIdMismatch { index, id } => {
                write!(f, "agent at index {index} has id {id}; ids must match indices")
            }
        }
    }
}

impl From<SimConfigError> for WorldInitError {
    fn from(err: SimConfigError) -> Self {
        WorldInitError::Config(err)
    }
}

impl Error for WorldInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldInitError::Config(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    InvalidSampleEvery,
    TooManyTicks { max: usize, actual: usize },
    TooManySamples { max: usize, actual: usize },
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            ExperimentError::TooManyTicks { max, actual } => {
                write!(f, "ticks ({actual}) exceed supported maximum ({max})")
            }
            ExperimentError::TooManySamples { max, actual } => {
                write!(
                    f,
                    "sample count ({actual}) exceeds supported maximum ({max})"
                )
            }
        }
    }
}

impl Error for ExperimentError {}

impl World {
    /// Seed a `ChaCha12Rng` from `config.seed` and populate the zone.
    ///
    /// Panics on an invalid config; see [`World::try_new`].
    pub fn new(config: SimConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(config: SimConfig) -> Result<Self, WorldInitError> {
        let rng = ChaCha12Rng::seed_from_u64(config.seed);
        World::with_rng(config, rng)
    }
}

impl<R: RandomSource> World<R> {
    pub const MAX_EXPERIMENT_TICKS: usize = 1_000_000;
    pub const MAX_EXPERIMENT_SAMPLES: usize = 50_000;

    /// Populate the zone with `config.population` randomly placed agents.
    pub fn with_rng(config: SimConfig, mut rng: R) -> Result<Self, WorldInitError> {
        config.validate()?;
        let zone = config.swim_zone();
        let size = config.agent_size();

        let mut agents = Vec::with_capacity(config.population);
        for id in 0..config.population {
            let x = grid_coordinate(&mut rng, zone.left, zone.max_x(size[0]));
            let y = grid_coordinate(&mut rng, zone.top, zone.max_y(size[1]));
            agents.push(Agent::spawn(id as AgentId, [x, y], &config, &mut rng));
        }
        Ok(Self::assemble(agents, config, rng))
    }

    /// Build a world around hand-placed agents. Ids must equal indices.
    pub fn from_agents(
        config: SimConfig,
        agents: Vec<Agent>,
        rng: R,
    ) -> Result<Self, WorldInitError> {
        config.validate()?;
        if let Some((index, agent)) = agents
            .iter()
            .enumerate()
            .find(|(index, agent)| agent.id as usize != *index)
        {
            return Err(WorldInitError::AgentIdMismatch {
                index,
                id: agent.id,
            });
        }
        Ok(Self::assemble(agents, config, rng))
    }

    fn assemble(agents: Vec<Agent>, config: SimConfig, rng: R) -> Self {
        let zone = config.swim_zone();
        info!(
            agents = agents.len(),
            left = zone.left,
            top = zone.top,
            right = zone.right,
            bottom = zone.bottom,
            "world created"
        );
        Self {
            agents,
            params: StepParams::from(&config),
            show_connections: config.show_connections,
            zone,
            config,
            rng,
            tick_index: 0,
            deaths_last_tick: 0,
            total_deaths: 0,
            death_events: Vec::new(),
        }
    }

    /// Advance every agent once, in creation order.
    ///
    /// Each agent sees the others as they are at that moment: earlier agents
    /// have already moved this tick, later ones have not. The result depends
    /// on creation order.
    pub fn tick(&mut self) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.deaths_last_tick = 0;

        for idx in 0..self.agents.len() {
            let (before, rest) = self.agents.split_at_mut(idx);
            let Some((agent, after)) = rest.split_first_mut() else {
                break;
            };
            let peers = Peers::new(before, after);
            if agent.step(&peers, &self.params, &self.zone, &mut self.rng) == StepOutcome::Starved
            {
                debug!(agent_id = agent.id, tick = self.tick_index, "agent starved");
                self.deaths_last_tick += 1;
                self.total_deaths += 1;
                self.death_events.push(DeathEvent {
                    agent_id: agent.id,
                    tick: self.tick_index,
                });
            }
        }

        if self.config.resolve_overlaps {
            let resolved = self.resolve_overlaps();
            if resolved > 0 {
                trace!(tick = self.tick_index, resolved, "separated overlapping pairs");
            }
        }
    }

    /// Separate every overlapping pair of swimming agents and clamp both back
    /// into the zone. Sinking bodies are never pushed. Returns the number of
    /// pairs resolved.
    pub fn resolve_overlaps(&mut self) -> usize {
        let zone = self.zone;
        let mut resolved = 0;
        for j in 1..self.agents.len() {
            let (head, tail) = self.agents.split_at_mut(j);
            let b = &mut tail[0];
            for a in head.iter_mut() {
                if !a.is_alive() || !b.is_alive() || !collision::check(a, b) {
                    continue;
                }
                collision::resolve(a, b);
                for agent in [&mut *a, &mut *b] {
                    agent.position = [
                        zone.clamp_x(agent.position[0], agent.size[0]),
                        zone.clamp_y(agent.position[1], agent.size[1]),
                    ];
                }
                resolved += 1;
            }
        }
        resolved
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn zone(&self) -> &SwimZone {
        &self.zone
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id as usize)
    }

    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    pub fn deaths_last_tick(&self) -> usize {
        self.deaths_last_tick
    }

    pub fn total_deaths(&self) -> usize {
        self.total_deaths
    }

    pub fn death_events(&self) -> &[DeathEvent] {
        &self.death_events
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    pub fn population_stats(&self) -> PopulationStats {
        let alive = self.alive_count();
        let hunger_sum: f64 = self
            .agents
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| a.hunger)
            .sum();
        PopulationStats {
            population_size: self.agents.len(),
            alive_count: alive,
            total_deaths: self.total_deaths,
            mean_hunger: if alive > 0 {
                hunger_sum / alive as f64
            } else {
                0.0
            },
        }
    }

    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(AgentSnapshot::from).collect()
    }

    pub fn snapshot(&self, id: AgentId) -> Option<AgentSnapshot> {
        self.agent(id).map(AgentSnapshot::from)
    }

    pub fn show_connections(&self) -> bool {
        self.show_connections
    }

    pub fn set_show_connections(&mut self, show: bool) {
        self.show_connections = show;
    }

    /// Flip the neighbor overlay and return its new state.
    pub fn toggle_connections(&mut self) -> bool {
        self.show_connections = !self.show_connections;
        self.show_connections
    }

    /// Center-to-center lines from each swimming agent to its nearest
    /// neighbor's current position. Empty while the overlay is off.
    pub fn connections(&self) -> Vec<Connection> {
        if !self.show_connections {
            return Vec::new();
        }
        self.agents
            .iter()
            .filter(|a| a.is_alive())
            .filter_map(|a| {
                let neighbor = self.agent(a.nearest()?.id)?;
                Some(Connection {
                    from_id: a.id,
                    to_id: neighbor.id,
                    from: a.rect().center(),
                    to: neighbor.rect().center(),
                })
            })
            .collect()
    }

    pub fn run_experiment(&mut self, ticks: usize, sample_every: usize) -> RunSummary {
        self.try_run_experiment(ticks, sample_every)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_run_experiment(
        &mut self,
        ticks: usize,
        sample_every: usize,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if ticks > Self::MAX_EXPERIMENT_TICKS {
            return Err(ExperimentError::TooManyTicks {
                max: Self::MAX_EXPERIMENT_TICKS,
                actual: ticks,
            });
        }
        let estimated_samples = if ticks == 0 {
            0
        } else {
            ((ticks - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_EXPERIMENT_SAMPLES {
            return Err(ExperimentError::TooManySamples {
                max: Self::MAX_EXPERIMENT_SAMPLES,
                actual: estimated_samples,
            });
        }

        let deaths_before = self.death_events.len();
        let mut samples = Vec::with_capacity(estimated_samples);
        for tick in 1..=ticks {
            self.tick();
            if tick % sample_every == 0 || tick == ticks {
                samples.push(self.collect_step_metrics());
            }
        }
        Ok(RunSummary {
            schema_version: 1,
            seed: self.config.seed,
            ticks,
            sample_every,
            final_alive_count: self.alive_count(),
            samples,
            deaths: self.death_events[deaths_before..].to_vec(),
        })
    }
}

/// Uniform whole-number coordinate in `[low, high]`, or `low` itself when
/// the span holds no whole number.
fn grid_coordinate<R: RandomSource + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    let first = low.ceil();
    let last = high.floor();
    if last < first {
        low
    } else {
        rng.int_inclusive(first as i64, last as i64) as f64
    }
}
