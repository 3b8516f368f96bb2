use crate::geometry::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible simulation runs.
    pub seed: u64,
    /// Width of the render surface the swim zone is inset from.
    pub surface_width: f64,
    /// Height of the render surface the swim zone is inset from.
    pub surface_height: f64,
    pub top_margin: f64,
    pub side_margin: f64,
    pub bottom_margin: f64,
    /// Number of agents created at setup.
    pub population: usize,
    pub agent_width: f64,
    pub agent_height: f64,
    /// Lower bound of the per-agent max speed draw (units per tick).
    pub min_max_speed: f64,
    /// Upper bound of the per-agent max speed draw (units per tick).
    pub max_max_speed: f64,
    pub initial_hunger: f64,
    /// Hunger lost per tick at rest; doubled at full speed.
    pub hunger_decay_base: f64,
    /// Below this hunger the speed ramps linearly down to zero.
    pub starvation_threshold: f64,
    /// Per-tick probability of re-evaluating direction.
    pub steer_probability: f64,
    /// Probability that a re-evaluation seeks the nearest neighbor.
    pub seek_probability: f64,
    /// Neighbors closer than this are never sought.
    pub seek_min_distance: f64,
    /// Fixed downward speed of a dead agent.
    pub sink_speed: f64,
    /// Presentation frame rate. Only governs tick cadence, never the math.
    pub fps: u32,
    /// Run the positional collision resolver after every tick.
    pub resolve_overlaps: bool,
    /// Initial state of the neighbor-connection overlay toggle.
    pub show_connections: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            surface_width: 1920.0,
            surface_height: 1080.0,
            top_margin: 50.0,
            side_margin: 50.0,
            bottom_margin: 50.0,
            population: 10,
            agent_width: 18.0,
            agent_height: 12.0,
            min_max_speed: 0.8,
            max_max_speed: 1.2,
            initial_hunger: 50.0,
            hunger_decay_base: 0.01,
            starvation_threshold: 30.0,
            steer_probability: 0.02,
            seek_probability: 0.6,
            seek_min_distance: 30.0,
            sink_speed: 0.2,
            fps: 60,
            resolve_overlaps: false,
            show_connections: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimConfigError {
    NonFinite { field: &'static str },
    InvalidAgentSize { width: f64, height: f64 },
    DegenerateZone { zone_width: f64, zone_height: f64 },
    InvalidSpeedRange { min: f64, max: f64 },
    InvalidProbability { field: &'static str, value: f64 },
    InvalidInitialHunger(f64),
    NegativeRate { field: &'static str, value: f64 },
    InvalidStarvationThreshold(f64),
    TooManyAgents { max: usize, actual: usize },
    Parse(String),
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimConfigError::NonFinite { field } => write!(f, "{field} must be finite"),
            SimConfigError::InvalidAgentSize { width, height } => {
                write!(f, "agent size ({width}x{height}) must be positive")
            }
            SimConfigError::DegenerateZone {
                zone_width,
                zone_height,
            } => write!(
                f,
                "swim zone ({zone_width}x{zone_height}) must be larger than one agent"
            ),
            SimConfigError::InvalidSpeedRange { min, max } => write!(
                f,
                "max speed range [{min}, {max}] must satisfy 0 < min <= max"
            ),
            SimConfigError::InvalidProbability { field, value } => {
                write!(f, "{field} ({value}) must be within [0, 1]")
            }
            SimConfigError::InvalidInitialHunger(v) => {
                write!(f, "initial_hunger ({v}) must be within (0, 100]")
            }
            SimConfigError::NegativeRate { field, value } => {
                write!(f, "{field} ({value}) must be non-negative")
            }
            SimConfigError::InvalidStarvationThreshold(v) => {
                write!(f, "starvation_threshold ({v}) must be positive")
            }
            SimConfigError::TooManyAgents { max, actual } => {
                write!(f, "population ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::Parse(msg) => write!(f, "invalid config json: {msg}"),
        }
    }
}

impl Error for SimConfigError {}

impl SimConfig {
    pub const MAX_POPULATION: usize = 10_000;
    pub const MAX_HUNGER: f64 = 100.0;

    pub fn from_json(text: &str) -> Result<Self, SimConfigError> {
        let config: SimConfig =
            serde_json::from_str(text).map_err(|e| SimConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimConfigError> {
        let finite_fields = [
            ("surface_width", self.surface_width),
            ("surface_height", self.surface_height),
            ("top_margin", self.top_margin),
            ("side_margin", self.side_margin),
            ("bottom_margin", self.bottom_margin),
            ("agent_width", self.agent_width),
            ("agent_height", self.agent_height),
            ("min_max_speed", self.min_max_speed),
            ("max_max_speed", self.max_max_speed),
            ("initial_hunger", self.initial_hunger),
            ("hunger_decay_base", self.hunger_decay_base),
            ("starvation_threshold", self.starvation_threshold),
            ("steer_probability", self.steer_probability),
            ("seek_probability", self.seek_probability),
            ("seek_min_distance", self.seek_min_distance),
            ("sink_speed", self.sink_speed),
        ];
        if let Some(&(field, _)) = finite_fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimConfigError::NonFinite { field });
        }
        if self.agent_width <= 0.0 || self.agent_height <= 0.0 {
            return Err(SimConfigError::InvalidAgentSize {
                width: self.agent_width,
                height: self.agent_height,
            });
        }
        let zone = self.swim_zone();
        if zone.width() <= self.agent_width || zone.height() <= self.agent_height {
            return Err(SimConfigError::DegenerateZone {
                zone_width: zone.width(),
                zone_height: zone.height(),
            });
        }
        if self.min_max_speed <= 0.0 || self.min_max_speed > self.max_max_speed {
            return Err(SimConfigError::InvalidSpeedRange {
                min: self.min_max_speed,
                max: self.max_max_speed,
            });
        }
        for (field, value) in [
            ("steer_probability", self.steer_probability),
            ("seek_probability", self.seek_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimConfigError::InvalidProbability { field, value });
            }
        }
        if self.initial_hunger <= 0.0 || self.initial_hunger > Self::MAX_HUNGER {
            return Err(SimConfigError::InvalidInitialHunger(self.initial_hunger));
        }
        for (field, value) in [
            ("hunger_decay_base", self.hunger_decay_base),
            ("sink_speed", self.sink_speed),
            ("seek_min_distance", self.seek_min_distance),
        ] {
            if value < 0.0 {
                return Err(SimConfigError::NegativeRate { field, value });
            }
        }
        if self.starvation_threshold <= 0.0 {
            return Err(SimConfigError::InvalidStarvationThreshold(
                self.starvation_threshold,
            ));
        }
        if self.population > Self::MAX_POPULATION {
            return Err(SimConfigError::TooManyAgents {
                max: Self::MAX_POPULATION,
                actual: self.population,
            });
        }
        Ok(())
    }

    pub fn agent_size(&self) -> Vec2 {
        [self.agent_width, self.agent_height]
    }

    pub fn swim_zone(&self) -> SwimZone {
        SwimZone {
            left: self.side_margin,
            top: self.top_margin,
            right: self.surface_width - self.side_margin,
            bottom: self.surface_height - self.bottom_margin,
        }
    }
}

/// The rectangle agents are confined to, inset from the surface by margins.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwimZone {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl SwimZone {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Largest top-left x an agent of `width` may occupy.
    pub fn max_x(&self, width: f64) -> f64 {
        self.right - width
    }

    /// Largest top-left y an agent of `height` may occupy.
    pub fn max_y(&self, height: f64) -> f64 {
        self.bottom - height
    }

    /// Whether `x` is a position an agent may move to (half-open on the right).
    pub fn accepts_x(&self, x: f64, width: f64) -> bool {
        self.left <= x && x < self.max_x(width)
    }

    pub fn accepts_y(&self, y: f64, height: f64) -> bool {
        self.top <= y && y < self.max_y(height)
    }

    pub fn clamp_x(&self, x: f64, width: f64) -> f64 {
        x.min(self.max_x(width)).max(self.left)
    }

    pub fn clamp_y(&self, y: f64, height: f64) -> f64 {
        y.min(self.max_y(height)).max(self.top)
    }

    /// Whether a box of `size` at `position` lies inside the zone (closed).
    pub fn contains(&self, position: Vec2, size: Vec2) -> bool {
        position[0] >= self.left
            && position[0] <= self.max_x(size[0])
            && position[1] >= self.top
            && position[1] <= self.max_y(size[1])
    }

    /// The open-water strip between the top of the surface and the zone.
    pub fn surface_band(&self) -> Rect {
        Rect::new([self.left, 0.0], [self.width(), self.top])
    }
}
