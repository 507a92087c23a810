//! Determinism verification tests
//!
//! Tests to ensure the simulation produces identical results given the same seed.

use opinion_core::output::generate_snapshot;
use opinion_core::{populate, Environment, InteractionModel, MovementModel, SimConfig, SimRng};

fn config(seed: u64, movement: MovementModel, interaction: InteractionModel) -> SimConfig {
    let mut config = SimConfig {
        seed,
        ..SimConfig::default()
    };
    config.world.width = 24;
    config.world.height = 24;
    config.population.num_agents = 150;
    config.dynamics.movement = movement;
    config.dynamics.interaction = interaction;
    config
}

fn run(config: &SimConfig, steps: u64) -> (String, Vec<String>) {
    let mut env = Environment::new(config);
    populate(&mut env, &config.population);
    env.run(steps);
    let frame = generate_snapshot(&env, 1).to_json().unwrap();
    let history = env
        .history()
        .records()
        .iter()
        .map(|r| r.to_jsonl().unwrap())
        .collect();
    (frame, history)
}

/// Test that the shared stream replays with the same seed
#[test]
fn test_rng_determinism() {
    let mut rng1 = SimRng::seeded(42);
    let mut rng2 = SimRng::seeded(42);

    let values1: Vec<f64> = (0..100).map(|_| rng1.unit()).collect();
    let values2: Vec<f64> = (0..100).map(|_| rng2.unit()).collect();
    assert_eq!(values1, values2, "RNG sequences should be identical with same seed");

    rng1.reseed(7);
    let mut rng3 = SimRng::seeded(7);
    assert_eq!(rng1.unit(), rng3.unit(), "reseeding should restart the stream");
}

/// Test that whole runs replay exactly for every model combination
#[test]
fn test_simulation_replays_with_same_seed() {
    for movement in [
        MovementModel::RandomWalk,
        MovementModel::PersistentWalk,
        MovementModel::Scheduled,
    ] {
        for interaction in [
            InteractionModel::Plain,
            InteractionModel::Integrity,
            InteractionModel::Persuasion,
        ] {
            let config = config(2024, movement, interaction);
            let first = run(&config, 40);
            let second = run(&config, 40);
            assert_eq!(first, second, "{:?}/{:?} diverged", movement, interaction);
        }
    }
}

/// Test that different seeds produce different runs
#[test]
fn test_different_seeds_diverge() {
    let a = run(&config(1, MovementModel::RandomWalk, InteractionModel::Integrity), 20);
    let b = run(&config(2, MovementModel::RandomWalk, InteractionModel::Integrity), 20);
    assert_ne!(a.0, b.0, "different seeds should place agents differently");
}

/// Test that disabling the social pass changes the random stream consumption
/// but not reproducibility
#[test]
fn test_social_toggle_is_reproducible() {
    let mut config = config(99, MovementModel::RandomWalk, InteractionModel::Integrity);
    config.dynamics.social_pass = false;
    assert_eq!(run(&config, 30), run(&config, 30));
}
