use crate::config::{SimConfig, SwimZone};
use crate::geometry::{self, Rect, Vec2};
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

pub type AgentId = u32;

/// Down, up, right, left in screen coordinates (y grows downward).
pub const AXIS_DIRECTIONS: [Vec2; 4] = [[0.0, 1.0], [0.0, -1.0], [1.0, 0.0], [-1.0, 0.0]];
pub const SINK_DIRECTION: Vec2 = [0.0, 1.0];

/// Inclusive per-channel ranges of the blue-ish color seed.
const COLOR_RANGES: [(i64, i64); 3] = [(0, 40), (125, 165), (215, 255)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    /// Terminal: the agent starved and now drifts to the floor.
    Sinking,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub id: AgentId,
    pub distance: f64,
    /// Where the neighbor stood when it was found.
    pub position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Swam,
    /// Hunger ran out during this step.
    Starved,
    Sank,
}

/// Behavior constants read by every step, taken from `SimConfig` once.
#[derive(Clone, Copy, Debug)]
pub struct StepParams {
    pub hunger_decay_base: f64,
    pub starvation_threshold: f64,
    pub steer_probability: f64,
    pub seek_probability: f64,
    pub seek_min_distance: f64,
    pub sink_speed: f64,
}

impl From<&SimConfig> for StepParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            hunger_decay_base: config.hunger_decay_base,
            starvation_threshold: config.starvation_threshold,
            steer_probability: config.steer_probability,
            seek_probability: config.seek_probability,
            seek_min_distance: config.seek_min_distance,
            sink_speed: config.sink_speed,
        }
    }
}

impl Default for StepParams {
    fn default() -> Self {
        Self::from(&SimConfig::default())
    }
}

/// Read-only view of every agent except the one being stepped, in creation
/// order. Agents before the stepping one have already moved this tick.
#[derive(Clone, Copy, Debug)]
pub struct Peers<'a> {
    before: &'a [Agent],
    after: &'a [Agent],
}

impl<'a> Peers<'a> {
    pub fn new(before: &'a [Agent], after: &'a [Agent]) -> Self {
        Self { before, after }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Agent> + 'a {
        self.before.iter().chain(self.after.iter())
    }
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    /// Top-left corner of the bounding box.
    pub position: Vec2,
    pub direction: Vec2,
    pub size: Vec2,
    pub max_speed: f64,
    pub current_speed: f64,
    pub hunger: f64,
    pub color_seed: [u8; 3],
    state: LifeState,
    nearest: Option<Neighbor>,
}

impl Agent {
    pub const DEFAULT_HUNGER: f64 = 50.0;

    pub fn new(
        id: AgentId,
        position: Vec2,
        direction: Vec2,
        size: Vec2,
        max_speed: f64,
        color_seed: [u8; 3],
    ) -> Self {
        Self {
            id,
            position,
            direction,
            size,
            max_speed,
            current_speed: max_speed,
            hunger: Self::DEFAULT_HUNGER,
            color_seed,
            state: LifeState::Alive,
            nearest: None,
        }
    }

    /// Create an agent at `position` with a random heading, color and top speed.
    pub fn spawn<R: RandomSource + ?Sized>(
        id: AgentId,
        position: Vec2,
        config: &SimConfig,
        rng: &mut R,
    ) -> Self {
        let direction = AXIS_DIRECTIONS[rng.index(AXIS_DIRECTIONS.len())];
        let mut color_seed = [0u8; 3];
        for (channel, &(low, high)) in color_seed.iter_mut().zip(COLOR_RANGES.iter()) {
            *channel = rng.int_inclusive(low, high) as u8;
        }
        let max_speed = rng.uniform(config.min_max_speed, config.max_max_speed);
        Self::new(id, position, direction, config.agent_size(), max_speed, color_seed)
            .with_hunger(config.initial_hunger)
    }

    pub fn with_hunger(mut self, hunger: f64) -> Self {
        self.hunger = hunger.clamp(0.0, SimConfig::MAX_HUNGER);
        self
    }

    pub fn state(&self) -> LifeState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    /// Nearest peer found during the last step; always `None` once sinking.
    pub fn nearest(&self) -> Option<Neighbor> {
        self.nearest
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn step<R: RandomSource + ?Sized>(
        &mut self,
        peers: &Peers<'_>,
        params: &StepParams,
        zone: &SwimZone,
        rng: &mut R,
    ) -> StepOutcome {
        match self.state {
            LifeState::Alive => self.swim(peers, params, zone, rng),
            LifeState::Sinking => {
                self.sink(peers, params, zone);
                StepOutcome::Sank
            }
        }
    }

    fn swim<R: RandomSource + ?Sized>(
        &mut self,
        peers: &Peers<'_>,
        params: &StepParams,
        zone: &SwimZone,
        rng: &mut R,
    ) -> StepOutcome {
        let starved = self.metabolize(params);
        self.nearest = self.find_nearest(peers);
        self.steer(params, rng);

        // On the starving step this runs at zero speed, so nothing moves but
        // the draws above still happen.
        let mut target = self.tentative_position(self.current_speed);
        if self.collides_ahead(target, peers) {
            self.direction = geometry::neg(self.direction);
            target = self.tentative_position(self.current_speed);
        }
        self.contain(target, zone);

        if starved {
            self.state = LifeState::Sinking;
            self.nearest = None;
            StepOutcome::Starved
        } else {
            StepOutcome::Swam
        }
    }

    fn sink(&mut self, peers: &Peers<'_>, params: &StepParams, zone: &SwimZone) {
        self.direction = SINK_DIRECTION;
        self.current_speed = params.sink_speed;
        self.nearest = None;

        let mut next_y = self.position[1] + params.sink_speed;
        if self.collides_ahead([self.position[0], next_y], peers) {
            next_y = self.position[1];
        }
        self.position[1] = next_y.min(zone.max_y(self.size[1]));
    }

    /// Burn hunger in proportion to last tick's effort and derive this tick's
    /// speed. Returns true when hunger hit zero.
    fn metabolize(&mut self, params: &StepParams) -> bool {
        let speed_ratio = if self.max_speed > 0.0 {
            self.current_speed / self.max_speed
        } else {
            0.0
        };
        let decay = params.hunger_decay_base * (1.0 + speed_ratio);
        self.hunger = (self.hunger - decay).max(0.0);

        self.current_speed = if self.hunger < params.starvation_threshold {
            self.max_speed * (self.hunger / params.starvation_threshold)
        } else {
            self.max_speed
        };

        if self.hunger <= 0.0 {
            self.current_speed = 0.0;
            return true;
        }
        false
    }

    /// Exact linear scan; ties keep the earliest peer in creation order.
    pub fn find_nearest(&self, peers: &Peers<'_>) -> Option<Neighbor> {
        let mut best: Option<Neighbor> = None;
        for other in peers.iter() {
            let distance = geometry::distance(self.position, other.position);
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(Neighbor {
                    id: other.id,
                    distance,
                    position: other.position,
                });
            }
        }
        best
    }

    fn steer<R: RandomSource + ?Sized>(&mut self, params: &StepParams, rng: &mut R) {
        if !rng.chance(params.steer_probability) {
            return;
        }
        let seek = rng.chance(params.seek_probability);
        match self.nearest {
            Some(n) if seek && n.distance > params.seek_min_distance => {
                self.direction = self.heading_to(n.position);
            }
            _ => {
                self.direction = AXIS_DIRECTIONS[rng.index(AXIS_DIRECTIONS.len())];
            }
        }
    }

    fn heading_to(&self, target: Vec2) -> Vec2 {
        geometry::normalize_or(geometry::sub(target, self.position), self.direction)
    }

    fn tentative_position(&self, speed: f64) -> Vec2 {
        geometry::add(self.position, geometry::scale(self.direction, speed))
    }

    /// Would a box at `target` overlap any peer where it stands right now?
    pub fn collides_ahead(&self, target: Vec2, peers: &Peers<'_>) -> bool {
        let future = Rect::new(target, self.size);
        peers.iter().any(|other| future.overlaps(&other.rect()))
    }

    /// Accept each axis independently; a rejected axis bounces and clamps the
    /// current coordinate instead of moving.
    fn contain(&mut self, target: Vec2, zone: &SwimZone) {
        let [width, height] = self.size;
        if zone.accepts_x(target[0], width) {
            self.position[0] = target[0];
        } else {
            self.direction[0] = -self.direction[0];
            self.position[0] = zone.clamp_x(self.position[0], width);
        }
        if zone.accepts_y(target[1], height) {
            self.position[1] = target[1];
        } else {
            self.direction[1] = -self.direction[1];
            self.position[1] = zone.clamp_y(self.position[1], height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    const SIZE: Vec2 = [18.0, 12.0];

    fn zone() -> SwimZone {
        SimConfig::default().swim_zone()
    }

    fn agent(id: AgentId, position: Vec2, direction: Vec2, max_speed: f64) -> Agent {
        Agent::new(id, position, direction, SIZE, max_speed, [20, 140, 230])
    }

    fn step_alone(a: &mut Agent, rng: &mut ScriptedRandom) -> StepOutcome {
        a.step(&Peers::new(&[], &[]), &StepParams::default(), &zone(), rng)
    }

    #[test]
    fn full_hunger_agent_loses_double_base_decay() {
        let mut a = agent(0, [500.0, 500.0], [1.0, 0.0], 1.0);
        let outcome = step_alone(&mut a, &mut ScriptedRandom::never());
        assert_eq!(outcome, StepOutcome::Swam);
        assert!((a.hunger - 49.98).abs() < 1e-9);
        assert_eq!(a.current_speed, 1.0);
        assert!((a.position[0] - 501.0).abs() < 1e-12);
    }

    #[test]
    fn low_hunger_ramps_speed_down() {
        let mut a = agent(0, [500.0, 500.0], [1.0, 0.0], 1.2).with_hunger(29.0);
        step_alone(&mut a, &mut ScriptedRandom::never());
        let expected_hunger = 29.0 - 0.01 * 2.0;
        assert!((a.hunger - expected_hunger).abs() < 1e-9);
        assert!((a.current_speed - 1.2 * expected_hunger / 30.0).abs() < 1e-9);
        assert!(a.current_speed < a.max_speed);
    }

    #[test]
    fn starvation_is_one_way_and_stops_motion() {
        let mut a = agent(0, [500.0, 500.0], [1.0, 0.0], 1.0).with_hunger(0.005);
        a.current_speed = 0.0;
        let outcome = step_alone(&mut a, &mut ScriptedRandom::never());
        assert_eq!(outcome, StepOutcome::Starved);
        assert_eq!(a.hunger, 0.0);
        assert_eq!(a.current_speed, 0.0);
        assert_eq!(a.position, [500.0, 500.0]);
        assert_eq!(a.state(), LifeState::Sinking);
        assert!(a.nearest().is_none());

        for _ in 0..20 {
            assert_eq!(step_alone(&mut a, &mut ScriptedRandom::never()), StepOutcome::Sank);
            assert!(!a.is_alive());
            assert_eq!(a.hunger, 0.0);
        }
        assert_eq!(a.current_speed, StepParams::default().sink_speed);
    }

    #[test]
    fn sinking_agent_drifts_down_and_rests_on_floor() {
        let z = zone();
        let floor = z.max_y(SIZE[1]);
        let mut a = agent(0, [300.0, floor - 0.5], [1.0, 0.0], 1.0).with_hunger(0.0);
        a.current_speed = 0.0;
        step_alone(&mut a, &mut ScriptedRandom::never());
        assert!(!a.is_alive());

        let x = a.position[0];
        let mut last_y = a.position[1];
        for _ in 0..10 {
            step_alone(&mut a, &mut ScriptedRandom::never());
            assert!(a.position[1] >= last_y);
            assert!(a.position[1] <= floor);
            assert_eq!(a.position[0], x);
            assert_eq!(a.direction, SINK_DIRECTION);
            last_y = a.position[1];
        }
        assert_eq!(a.position[1], floor);
    }

    #[test]
    fn sinking_agent_is_held_up_by_a_body_below() {
        let mut corpse = agent(0, [300.0, 400.0], [0.0, 1.0], 1.0).with_hunger(0.0);
        corpse.current_speed = 0.0;
        step_alone(&mut corpse, &mut ScriptedRandom::never());
        let below = [agent(1, [300.0, 412.1], [1.0, 0.0], 1.0)];
        let peers = Peers::new(&[], &below);
        let outcome = corpse.step(
            &peers,
            &StepParams::default(),
            &zone(),
            &mut ScriptedRandom::never(),
        );
        assert_eq!(outcome, StepOutcome::Sank);
        assert_eq!(corpse.position[1], 400.0);
    }

    #[test]
    fn nearest_neighbor_ties_keep_first_in_order() {
        let me = agent(5, [100.0, 100.0], [1.0, 0.0], 1.0);
        let before = [agent(0, [130.0, 100.0], [1.0, 0.0], 1.0)];
        let after = [
            agent(6, [100.0, 70.0], [1.0, 0.0], 1.0),
            agent(7, [100.0, 300.0], [1.0, 0.0], 1.0),
        ];
        let n = me.find_nearest(&Peers::new(&before, &after)).unwrap();
        assert_eq!(n.id, 0);
        assert_eq!(n.distance, 30.0);
        assert!(me.find_nearest(&Peers::new(&[], &[])).is_none());
    }

    #[test]
    fn seeking_turns_toward_a_distant_neighbor() {
        let mut me = agent(0, [100.0, 100.0], [1.0, 0.0], 1.0);
        let others = [agent(1, [100.0, 200.0], [1.0, 0.0], 1.0)];
        // steer roll, seek roll
        let mut rng = ScriptedRandom::new(vec![0.0, 0.0]);
        me.step(&Peers::new(&[], &others), &StepParams::default(), &zone(), &mut rng);
        assert_eq!(me.direction, [0.0, 1.0]);
        assert_eq!(rng.draws(), 2);
        assert_eq!(me.nearest().map(|n| n.id), Some(1));
        assert!((me.position[1] - 101.0).abs() < 1e-12);
    }

    #[test]
    fn close_neighbor_falls_back_to_random_axis() {
        let mut me = agent(0, [100.0, 100.0], [0.0, 1.0], 1.0);
        let others = [agent(1, [100.0, 125.0], [1.0, 0.0], 1.0)];
        // steer roll, seek roll, axis index 2 => right
        let mut rng = ScriptedRandom::new(vec![0.0, 0.0, 0.6]);
        me.step(&Peers::new(&[], &others), &StepParams::default(), &zone(), &mut rng);
        assert_eq!(me.direction, [1.0, 0.0]);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn failed_seek_roll_picks_random_axis() {
        let mut me = agent(0, [100.0, 100.0], [1.0, 0.0], 1.0);
        let others = [agent(1, [400.0, 400.0], [1.0, 0.0], 1.0)];
        // steer roll, seek roll fails, axis index 1 => up
        let mut rng = ScriptedRandom::new(vec![0.0, 0.9, 0.3]);
        me.step(&Peers::new(&[], &others), &StepParams::default(), &zone(), &mut rng);
        assert_eq!(me.direction, [0.0, -1.0]);
    }

    #[test]
    fn blocked_move_reverses_direction() {
        let mut me = agent(0, [100.0, 100.0], [1.0, 0.0], 1.0);
        let others = [agent(1, [118.5, 100.0], [-1.0, 0.0], 1.0)];
        let outcome = me.step(
            &Peers::new(&[], &others),
            &StepParams::default(),
            &zone(),
            &mut ScriptedRandom::never(),
        );
        assert_eq!(outcome, StepOutcome::Swam);
        assert_eq!(me.direction, [-1.0, 0.0]);
        assert_eq!(me.position, [99.0, 100.0]);
        assert!(!me.rect().overlaps(&others[0].rect()));
    }

    #[test]
    fn reversed_move_is_taken_even_when_it_collides() {
        let mut me = agent(0, [100.0, 100.0], [1.0, 0.0], 1.0);
        let ahead = [agent(1, [118.5, 100.0], [-1.0, 0.0], 1.0)];
        let behind = [agent(2, [81.5, 100.0], [1.0, 0.0], 1.0)];
        let outcome = me.step(
            &Peers::new(&behind, &ahead),
            &StepParams::default(),
            &zone(),
            &mut ScriptedRandom::never(),
        );
        assert_eq!(outcome, StepOutcome::Swam);
        assert_eq!(me.direction, [-1.0, 0.0]);
        // no second reversal: the agent moves into the peer behind it
        assert_eq!(me.position, [99.0, 100.0]);
        assert!(me.rect().overlaps(&behind[0].rect()));
        assert!(!me.rect().overlaps(&ahead[0].rect()));
    }

    #[test]
    fn wall_on_the_left_flips_x_and_clamps() {
        let z = zone();
        let mut me = agent(0, [z.left, 300.0], [-1.0, 0.0], 1.0);
        step_alone(&mut me, &mut ScriptedRandom::never());
        assert_eq!(me.position[0], z.left);
        assert_eq!(me.direction[0], 1.0);
        assert_eq!(me.position[1], 300.0);
    }

    #[test]
    fn axes_bounce_independently() {
        let z = zone();
        let diagonal = geometry::normalize_or([1.0, -1.0], [1.0, 0.0]);
        let mut me = agent(0, [400.0, z.top], diagonal, 1.0);
        step_alone(&mut me, &mut ScriptedRandom::never());
        assert!(me.position[0] > 400.0);
        assert_eq!(me.position[1], z.top);
        assert!(me.direction[0] > 0.0);
        assert!(me.direction[1] > 0.0);
    }

    #[test]
    fn spawn_draws_within_reference_ranges() {
        let config = SimConfig::default();
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        for id in 0..200 {
            let a = Agent::spawn(id, [100.0, 100.0], &config, &mut rng);
            assert!(AXIS_DIRECTIONS.contains(&a.direction));
            assert!(a.color_seed[0] <= 40);
            assert!((125..=165).contains(&a.color_seed[1]));
            assert!(a.color_seed[2] >= 215);
            assert!((0.8..1.2).contains(&a.max_speed));
            assert_eq!(a.current_speed, a.max_speed);
            assert_eq!(a.hunger, 50.0);
            assert!(a.is_alive());
        }
    }
}
