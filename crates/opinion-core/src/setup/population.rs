//! Population Seeding
//!
//! Places an equal number of agents per opinion on random empty cells, pins a
//! fraction of them at high integrity and builds the friend graph.

use bevy_ecs::prelude::*;
use tracing::{info, warn};

use super::friends::build_social_graph;
use crate::components::agent::{Opinion, Position};
use crate::config::PopulationConfig;
use crate::environment::{AgentSpec, Environment};

/// Outcome of a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationSummary {
    pub requested: usize,
    pub placed: usize,
    pub high_integrity: usize,
    pub friendships: usize,
}

impl PopulationSummary {
    pub fn skipped(&self) -> usize {
        self.requested - self.placed
    }
}

/// Seed `env` with `config.num_agents / 3` agents per opinion.
///
/// The remainder of the division is dropped. Empty cells are listed once up
/// front and each agent takes a uniformly random one; when the grid fills up
/// placement stops with a warning.
pub fn populate(env: &mut Environment, config: &PopulationConfig) -> PopulationSummary {
    let per_opinion = config.num_agents / usize::from(Opinion::COUNT);
    let requested = per_opinion * usize::from(Opinion::COUNT);

    let mut free: Vec<Position> = env.grid().empty_cells();
    let mut placed: Vec<Entity> = Vec::with_capacity(requested);

    'opinions: for opinion in Opinion::all() {
        for _ in 0..per_opinion {
            if free.is_empty() {
                warn!(
                    requested,
                    placed = placed.len(),
                    "grid is full, remaining agents not placed"
                );
                break 'opinions;
            }
            let pick = env.rng_mut().between(0, free.len() - 1);
            let cell = free.swap_remove(pick);
            if let Some(entity) = env.add_agent(AgentSpec::new(cell, opinion)) {
                placed.push(entity);
            }
        }
    }

    let high_count = ((config.high_integrity_ratio * placed.len() as f64).round() as usize)
        .min(placed.len());
    let chosen = env.rng_mut().sample(&placed, high_count);
    let high_integrity = chosen
        .into_iter()
        .filter(|entity| env.make_high_integrity(*entity))
        .count();

    let friendships = if env.dynamics().social_pass {
        build_social_graph(env, config.friend_cap)
    } else {
        0
    };

    let summary = PopulationSummary {
        requested,
        placed: placed.len(),
        high_integrity,
        friendships,
    };
    info!(
        placed = summary.placed,
        skipped = summary.skipped(),
        high_integrity = summary.high_integrity,
        friendships = summary.friendships,
        "population seeded"
    );
    summary
}
