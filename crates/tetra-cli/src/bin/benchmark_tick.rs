use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::Instant;
use tetra_core::{SimConfig, World};

fn main() {
    let steps = 200u32;

    for population in [10usize, 100, 500, 1_000] {
        let config = SimConfig {
            population,
            seed: 42,
            ..SimConfig::default()
        };
        println!("Benchmarking {} agents for {} ticks", population, steps);

        let rng = ChaCha12Rng::seed_from_u64(config.seed);
        let mut world = match World::with_rng(config.clone(), rng) {
            Ok(world) => world,
            Err(e) => {
                eprintln!("skipping population {population}: {e}");
                continue;
            }
        };

        let start = Instant::now();
        for _ in 0..steps {
            world.tick();
        }
        let duration = start.elapsed();
        println!("  Time for {} ticks: {:?}", steps, duration);
        println!("  Avg time per tick: {:?}", duration / steps);

        // Same workload again with metrics and the overlap pass every tick.
        let overlap_config = SimConfig {
            resolve_overlaps: true,
            ..config
        };
        let mut world = World::new(overlap_config);
        let start = Instant::now();
        world.run_experiment(steps as usize, 1);
        let with_metrics = start.elapsed();
        println!("  Avg time per tick (metrics + overlaps): {:?}", with_metrics / steps);
        println!(
            "  Overhead per tick: {:?}",
            with_metrics.saturating_sub(duration) / steps
        );
    }
}
