use tetra_core::{Agent, LifeState, SimConfig, World};

fn tank(seed: u64, resolve_overlaps: bool) -> SimConfig {
    SimConfig {
        seed,
        surface_width: 640.0,
        surface_height: 480.0,
        population: 25,
        resolve_overlaps,
        ..SimConfig::default()
    }
}

/// Check every per-tick invariant between two consecutive states.
fn assert_transition(config: &SimConfig, before: &[Agent], after: &[Agent]) {
    let zone = config.swim_zone();
    for (prev, next) in before.iter().zip(after) {
        assert!(
            zone.contains(next.position, next.size),
            "agent {} escaped to {:?}",
            next.id,
            next.position
        );
        assert!((0.0..=100.0).contains(&next.hunger));

        match (prev.state(), next.state()) {
            (LifeState::Alive, LifeState::Alive) => {
                assert!(next.hunger <= prev.hunger);
                assert!(next.current_speed <= next.max_speed);
                assert!(next.hunger > 0.0);
            }
            (LifeState::Alive, LifeState::Sinking) => {
                assert_eq!(next.hunger, 0.0);
                assert_eq!(next.current_speed, 0.0);
                assert_eq!(next.position, prev.position);
            }
            (LifeState::Sinking, LifeState::Sinking) => {
                assert_eq!(next.hunger, 0.0);
                assert_eq!(next.position[0], prev.position[0]);
                assert!(next.position[1] >= prev.position[1]);
                assert!(next.nearest().is_none());
                assert_eq!(next.current_speed, config.sink_speed);
            }
            (LifeState::Sinking, LifeState::Alive) => {
                panic!("agent {} came back to life", next.id)
            }
        }
    }
}

fn run_checked(config: SimConfig, ticks: usize) -> World {
    let mut world = World::new(config.clone());
    for _ in 0..ticks {
        let before = world.agents().to_vec();
        world.tick();
        assert_transition(&config, &before, world.agents());
    }
    world
}

#[test]
fn invariants_hold_through_a_whole_lifetime() {
    let world = run_checked(tank(3, false), 4_000);
    assert_eq!(world.alive_count(), 0);
    assert_eq!(world.total_deaths(), 25);
}

#[test]
fn invariants_hold_with_overlap_resolution() {
    // Sinking bodies are never pushed, so the sinking checks still apply.
    let world = run_checked(tank(5, true), 3_500);
    assert_eq!(world.alive_count(), 0);
}

#[test]
fn bodies_come_to_rest_on_the_floor() {
    let config = SimConfig {
        population: 4,
        ..tank(11, false)
    };
    let mut world = World::new(config.clone());
    for _ in 0..6_000 {
        world.tick();
    }
    let floor = config.swim_zone().max_y(config.agent_height);
    let metrics = world.collect_step_metrics();
    assert_eq!(metrics.alive_count, 0);
    assert_eq!(metrics.sinking_count, 4);
    // Bodies may land on one another, but every one stops at or above the floor.
    assert!(world.agents().iter().all(|a| a.position[1] <= floor));
    assert!(metrics.settled_count >= 1);
}

#[test]
fn snapshots_serialize_for_presenters() {
    let mut world = World::new(tank(8, false));
    world.set_show_connections(true);
    for _ in 0..50 {
        world.tick();
    }
    let snapshots = world.snapshots();
    assert_eq!(snapshots.len(), 25);
    assert!(snapshots.iter().all(|s| s.alive && s.nearest_neighbor.is_some()));
    assert_eq!(world.connections().len(), 25);

    let json = serde_json::to_value(&snapshots).unwrap();
    assert_eq!(json[0]["id"], 0);
    assert!(json[0]["hunger"].as_f64().unwrap() < 50.0);
}
