//! Population and clock resources.

use bevy_ecs::prelude::*;

use crate::rng::SimRng;

/// Resource: the agent collection in current iteration order
///
/// Each pass shuffles this order before visiting agents, so no agent is
/// systematically first across many ticks.
#[derive(Resource, Debug, Default)]
pub struct Population {
    agents: Vec<Entity>,
    next_index: u32,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agents(&self) -> &[Entity] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.agents.contains(&entity)
    }

    /// Reserve the next construction index.
    pub fn allocate_index(&mut self) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    pub fn push(&mut self, entity: Entity) {
        self.agents.push(entity);
    }

    /// Returns whether the entity was a member.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.agents.len();
        self.agents.retain(|e| *e != entity);
        self.agents.len() != before
    }

    pub fn shuffle(&mut self, rng: &mut SimRng) {
        rng.shuffle(&mut self.agents);
    }
}

/// Resource: number of completed steps
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimClock {
    pub step: u64,
}

impl SimClock {
    pub fn advance(&mut self) {
        self.step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_membership() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        let mut population = Population::new();
        population.push(a);
        population.push(b);
        assert_eq!(population.len(), 2);

        assert!(population.remove(a));
        assert!(!population.remove(a));
        assert!(!population.contains(a));
        assert!(population.contains(b));
    }

    #[test]
    fn test_indices_are_never_reused() {
        let mut population = Population::new();
        assert_eq!(population.allocate_index(), 0);
        assert_eq!(population.allocate_index(), 1);
        assert_eq!(population.allocate_index(), 2);
    }

    #[test]
    fn test_shuffle_keeps_members() {
        let mut world = World::new();
        let mut population = Population::new();
        for _ in 0..20 {
            population.push(world.spawn_empty().id());
        }
        let mut before = population.agents().to_vec();
        population.shuffle(&mut SimRng::seeded(8));
        let mut after = population.agents().to_vec();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }
}
