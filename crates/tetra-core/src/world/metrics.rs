use super::World;
use crate::agent::AgentId;
use crate::rng::RandomSource;
use crate::spatial;
use serde::{Deserialize, Serialize};

/// Starting half-width of the nearest-neighbor search window.
const NEIGHBOR_SEARCH_RADIUS: f64 = 32.0;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StepMetrics {
    pub tick: u64,
    pub alive_count: usize,
    pub sinking_count: usize,
    /// Sinking bodies resting on the floor of the zone.
    pub settled_count: usize,
    pub hunger_mean: f64,
    pub hunger_min: f64,
    pub speed_mean: f64,
    pub deaths: usize,
    /// Mean distance from each swimming agent to its closest other agent.
    pub mean_nearest_distance: f64,
    pub overlapping_pairs: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathEvent {
    pub agent_id: AgentId,
    pub tick: u64,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub seed: u64,
    pub ticks: usize,
    pub sample_every: usize,
    pub final_alive_count: usize,
    pub samples: Vec<StepMetrics>,
    #[serde(default)]
    pub deaths: Vec<DeathEvent>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PopulationStats {
    pub population_size: usize,
    pub alive_count: usize,
    pub total_deaths: usize,
    pub mean_hunger: f64,
}

impl<R: RandomSource> World<R> {
    pub fn collect_step_metrics(&self) -> StepMetrics {
        let agents = self.agents();
        let zone = self.zone();

        let mut alive = 0usize;
        let mut sinking = 0usize;
        let mut settled = 0usize;
        let mut hunger_sum = 0.0f64;
        let mut hunger_min = f64::INFINITY;
        let mut speed_sum = 0.0f64;
        for agent in agents {
            if agent.is_alive() {
                alive += 1;
                hunger_sum += agent.hunger;
                hunger_min = hunger_min.min(agent.hunger);
                speed_sum += agent.current_speed;
            } else {
                sinking += 1;
                if agent.position[1] >= zone.max_y(agent.size[1]) {
                    settled += 1;
                }
            }
        }
        let denom = alive.max(1) as f64;

        let tree = spatial::build_index(agents);
        let mut nearest_sum = 0.0f64;
        let mut nearest_count = 0usize;
        for agent in agents.iter().filter(|a| a.is_alive()) {
            if let Some((_, d)) =
                spatial::nearest_other(&tree, agent.position, agent.id, NEIGHBOR_SEARCH_RADIUS)
            {
                nearest_sum += d;
                nearest_count += 1;
            }
        }

        StepMetrics {
            tick: self.tick_index(),
            alive_count: alive,
            sinking_count: sinking,
            settled_count: settled,
            hunger_mean: hunger_sum / denom,
            hunger_min: if alive > 0 { hunger_min } else { 0.0 },
            speed_mean: speed_sum / denom,
            deaths: self.deaths_last_tick(),
            mean_nearest_distance: if nearest_count > 0 {
                nearest_sum / nearest_count as f64
            } else {
                0.0
            },
            overlapping_pairs: spatial::count_overlapping_pairs(&tree, agents),
        }
    }
}
