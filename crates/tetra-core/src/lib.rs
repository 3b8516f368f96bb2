pub mod agent;
pub mod collision;
pub mod config;
pub mod geometry;
pub mod rng;
pub mod snapshot;
pub mod spatial;
pub mod world;

pub use agent::{Agent, AgentId, LifeState, Neighbor, StepOutcome};
pub use config::{SimConfig, SimConfigError, SwimZone};
pub use rng::{RandomSource, ScriptedRandom};
pub use snapshot::{AgentSnapshot, Connection};
pub use world::{
    DeathEvent, ExperimentError, PopulationStats, RunSummary, StepMetrics, World, WorldInitError,
};
