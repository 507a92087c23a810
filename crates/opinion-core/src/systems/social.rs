//! Social Pass
//!
//! Agents talk to a few of their friends each tick, with dampened effect.

use bevy_ecs::prelude::*;
use tracing::trace;

use super::interaction::{interact_entities, InteractionQuery};
use crate::components::population::{Population, SimClock};
use crate::components::social::SocialGraph;
use crate::config::{DynamicsConfig, Tuning};
use crate::rng::SimRng;

/// Run condition: the friend pass is switched on.
pub fn social_pass_enabled(dynamics: Res<DynamicsConfig>) -> bool {
    dynamics.social_pass
}

/// Draw between one and `max` distinct friends, never more than there are.
pub fn sample_friends(friends: &[Entity], max: usize, rng: &mut SimRng) -> Vec<Entity> {
    if friends.is_empty() {
        return Vec::new();
    }
    let count = rng.between(1, max.min(friends.len()));
    rng.sample(friends, count)
}

/// System: every agent with friends samples between one and
/// `max_sampled_friends` of them without replacement and interacts with each.
pub fn social_pass(
    mut rng: ResMut<SimRng>,
    mut population: ResMut<Population>,
    graph: Res<SocialGraph>,
    clock: Res<SimClock>,
    dynamics: Res<DynamicsConfig>,
    tuning: Res<Tuning>,
    mut agents: InteractionQuery,
) {
    let rng = &mut *rng;
    population.shuffle(rng);

    let mut interactions = 0usize;
    for &entity in population.agents() {
        let friends: Vec<Entity> = graph.friends_of(entity).collect();
        for friend in sample_friends(&friends, tuning.max_sampled_friends, rng) {
            if interact_entities(
                &mut agents,
                entity,
                friend,
                dynamics.interaction,
                &tuning,
                rng,
                true,
            ) {
                interactions += 1;
            }
        }
    }

    trace!(step = clock.step, interactions, "social pass");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn test_sample_friends_bounds_and_distinctness() {
        let friends = entities(6);
        let mut rng = SimRng::seeded(21);
        let mut sizes = BTreeSet::new();

        for _ in 0..500 {
            let picked = sample_friends(&friends, 3, &mut rng);
            assert!((1..=3).contains(&picked.len()), "sampled {}", picked.len());
            let distinct: BTreeSet<_> = picked.iter().copied().collect();
            assert_eq!(distinct.len(), picked.len(), "friend sampled twice");
            assert!(picked.iter().all(|f| friends.contains(f)));
            sizes.insert(picked.len());
        }
        assert_eq!(sizes, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_sample_friends_caps_at_friend_count() {
        let friends = entities(2);
        let mut rng = SimRng::seeded(22);
        for _ in 0..100 {
            let picked = sample_friends(&friends, 3, &mut rng);
            assert!((1..=2).contains(&picked.len()));
        }
        assert_eq!(sample_friends(&friends[..1], 3, &mut rng), vec![friends[0]]);
        assert!(sample_friends(&[], 3, &mut rng).is_empty());
    }
}
