//! Friendship Setup
//!
//! Friend ties form once, after seeding, between agents that share an
//! opinion. They are never rebuilt mid-run.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

use crate::components::agent::Opinion;
use crate::components::social::SocialGraph;
use crate::environment::Environment;
use crate::rng::SimRng;

/// Befriend agents drawn uniformly from `candidates` until `agent` has `k`
/// friends.
///
/// Self, existing friends and candidates already at `k` friends are never
/// picked. Stops early once the candidates run out. Returns the number of new
/// ties.
pub fn add_friends(
    graph: &mut SocialGraph,
    agent: Entity,
    candidates: &[Entity],
    k: usize,
    rng: &mut SimRng,
) -> usize {
    let mut pool: Vec<Entity> = candidates
        .iter()
        .copied()
        .filter(|c| *c != agent && !graph.are_friends(agent, *c) && graph.degree(*c) < k)
        .collect();

    let mut added = 0;
    while graph.degree(agent) < k && !pool.is_empty() {
        let pick = rng.between(0, pool.len() - 1);
        let friend = pool.swap_remove(pick);
        if graph.befriend(agent, friend) {
            added += 1;
        }
    }
    added
}

/// Give every agent, in population order, up to `cap` same-opinion friends.
///
/// Ties made by earlier agents count toward later agents' degree, so no agent
/// ends construction with more than `cap` friends.
pub fn build_social_graph(env: &mut Environment, cap: usize) -> usize {
    let members: Vec<(Entity, Opinion)> = env
        .population()
        .iter()
        .filter_map(|e| env.world().get::<Opinion>(*e).map(|o| (*e, *o)))
        .collect();

    let mut by_opinion: BTreeMap<Opinion, Vec<Entity>> = BTreeMap::new();
    for (entity, opinion) in &members {
        by_opinion.entry(*opinion).or_default().push(*entity);
    }

    env.world_mut()
        .resource_scope(|world, mut graph: Mut<SocialGraph>| {
            let mut rng = world.resource_mut::<SimRng>();
            for (entity, opinion) in &members {
                let candidates = by_opinion.get(opinion).map(Vec::as_slice).unwrap_or(&[]);
                add_friends(&mut graph, *entity, candidates, cap, &mut rng);
            }
        });

    env.social_graph().edge_count()
}
