//! Social Graph
//!
//! Symmetric friendship relation between agents.

use bevy_ecs::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Resource: undirected friendship edges
///
/// Every mutation touches both endpoints, so `b` is in `friends_of(a)` exactly
/// when `a` is in `friends_of(b)`. Ordered collections keep iteration stable
/// under a fixed seed.
#[derive(Resource, Debug, Default, Clone)]
pub struct SocialGraph {
    ties: BTreeMap<Entity, BTreeSet<Entity>>,
}

impl SocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link two agents. Returns false for self-links and existing ties.
    pub fn befriend(&mut self, a: Entity, b: Entity) -> bool {
        if a == b || self.are_friends(a, b) {
            return false;
        }
        self.ties.entry(a).or_default().insert(b);
        self.ties.entry(b).or_default().insert(a);
        true
    }

    /// Unlink two agents. Returns whether a tie existed.
    pub fn unfriend(&mut self, a: Entity, b: Entity) -> bool {
        let removed = self.ties.get_mut(&a).is_some_and(|set| set.remove(&b));
        if removed {
            if let Some(set) = self.ties.get_mut(&b) {
                set.remove(&a);
            }
        }
        removed
    }

    /// Drop an agent and every tie it has.
    pub fn forget(&mut self, agent: Entity) {
        if let Some(friends) = self.ties.remove(&agent) {
            for friend in friends {
                if let Some(set) = self.ties.get_mut(&friend) {
                    set.remove(&agent);
                }
            }
        }
    }

    pub fn are_friends(&self, a: Entity, b: Entity) -> bool {
        self.ties.get(&a).is_some_and(|set| set.contains(&b))
    }

    pub fn friends_of(&self, agent: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.ties.get(&agent).into_iter().flatten().copied()
    }

    pub fn degree(&self, agent: Entity) -> usize {
        self.ties.get(&agent).map_or(0, |set| set.len())
    }

    /// Number of undirected ties.
    pub fn edge_count(&self) -> usize {
        self.ties.values().map(|s| s.len()).sum::<usize>() / 2
    }

    /// Every tie once, as `(lower, higher)` entity pairs.
    pub fn edges(&self) -> impl Iterator<Item = (Entity, Entity)> + '_ {
        self.ties
            .iter()
            .flat_map(|(a, set)| set.iter().map(move |b| (*a, *b)))
            .filter(|(a, b)| a < b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: u32) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn test_befriend_is_symmetric() {
        let e = entities(3);
        let mut graph = SocialGraph::new();

        assert!(graph.befriend(e[0], e[1]));
        assert!(graph.are_friends(e[0], e[1]));
        assert!(graph.are_friends(e[1], e[0]));
        assert!(!graph.befriend(e[1], e[0]));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree(e[2]), 0);
    }

    #[test]
    fn test_no_self_friendship() {
        let e = entities(1);
        let mut graph = SocialGraph::new();
        assert!(!graph.befriend(e[0], e[0]));
        assert_eq!(graph.degree(e[0]), 0);
    }

    #[test]
    fn test_unfriend_and_forget() {
        let e = entities(3);
        let mut graph = SocialGraph::new();
        graph.befriend(e[0], e[1]);
        graph.befriend(e[0], e[2]);

        assert!(graph.unfriend(e[1], e[0]));
        assert!(!graph.are_friends(e[0], e[1]));
        assert!(!graph.unfriend(e[1], e[0]));

        graph.forget(e[0]);
        assert_eq!(graph.degree(e[2]), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edges_listed_once() {
        let e = entities(4);
        let mut graph = SocialGraph::new();
        graph.befriend(e[0], e[1]);
        graph.befriend(e[2], e[1]);
        graph.befriend(e[3], e[0]);

        assert_eq!(graph.edges().count(), 3);
        assert_eq!(graph.friends_of(e[1]).count(), 2);
    }
}
