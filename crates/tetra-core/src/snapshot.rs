use crate::agent::{Agent, AgentId};
use crate::geometry::{Rect, Vec2};
use serde::{Deserialize, Serialize};

const DEAD_COLOR: [u8; 3] = [255, 255, 255];

/// Everything a presentation layer needs to draw one agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: Vec2,
    pub size: Vec2,
    pub direction: Vec2,
    pub speed: f64,
    pub alive: bool,
    pub hunger: f64,
    pub color_seed: [u8; 3],
    pub nearest_neighbor: Option<AgentId>,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            position: agent.position,
            size: agent.size,
            direction: agent.direction,
            speed: agent.current_speed,
            alive: agent.is_alive(),
            hunger: agent.hunger,
            color_seed: agent.color_seed,
            nearest_neighbor: agent.nearest().map(|n| n.id),
        }
    }
}

impl AgentSnapshot {
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    /// Seed color washed toward white as hunger drops; dead bodies are white.
    pub fn display_color(&self) -> [u8; 3] {
        if !self.alive {
            return DEAD_COLOR;
        }
        let wash = 255.0 * (1.0 - self.hunger / 100.0);
        self.color_seed
            .map(|channel| (channel as f64 + wash).min(255.0) as u8)
    }
}

/// Line between the centers of an agent and its nearest neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from_id: AgentId,
    pub to_id: AgentId,
    pub from: Vec2,
    pub to: Vec2,
}
