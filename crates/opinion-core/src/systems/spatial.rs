//! Spatial Pass
//!
//! Every agent interacts with each occupant inside its reach. Reach scales
//! with integrity, so wavering agents only talk to their immediate
//! neighbours, or to nobody.

use bevy_ecs::prelude::*;
use tracing::trace;

use super::interaction::{interact_entities, InteractionQuery};
use crate::components::agent::{Agent, Integrity, Position};
use crate::components::grid::Grid;
use crate::components::population::{Population, SimClock};
use crate::config::{DynamicsConfig, Tuning};
use crate::rng::SimRng;

/// Interaction radius for an agent: integrity-scaled when it has integrity,
/// the fixed radius otherwise.
pub fn interaction_radius(integrity: Option<&Integrity>, tuning: &Tuning) -> u32 {
    integrity.map_or(tuning.fixed_radius, |i| i.interaction_radius(tuning.max_radius))
}

/// System: shuffle, then scan each agent's neighbourhood and interact once
/// with every occupant found.
#[allow(clippy::too_many_arguments)]
pub fn spatial_pass(
    mut rng: ResMut<SimRng>,
    mut population: ResMut<Population>,
    grid: Res<Grid>,
    clock: Res<SimClock>,
    dynamics: Res<DynamicsConfig>,
    tuning: Res<Tuning>,
    positions: Query<&Position, With<Agent>>,
    mut agents: InteractionQuery,
) {
    let rng = &mut *rng;
    population.shuffle(rng);

    let mut interactions = 0usize;
    for &entity in population.agents() {
        let Ok(position) = positions.get(entity).copied() else {
            continue;
        };
        let Ok((_, integrity, _)) = agents.get(entity) else {
            continue;
        };
        let radius = interaction_radius(integrity, &tuning);
        if radius == 0 {
            continue;
        }

        // Interactions never move anyone, so the occupants found up front
        // are the occupants at interaction time.
        for other in grid.occupants_within(position, radius, dynamics.neighborhood) {
            if interact_entities(
                &mut agents,
                entity,
                other,
                dynamics.interaction,
                &tuning,
                rng,
                false,
            ) {
                interactions += 1;
            }
        }
    }

    trace!(step = clock.step, interactions, "spatial pass");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_by_model() {
        let tuning = Tuning::default();
        assert_eq!(interaction_radius(None, &tuning), 1);
        assert_eq!(interaction_radius(Some(&Integrity::new(0.2)), &tuning), 0);
        assert_eq!(interaction_radius(Some(&Integrity::new(0.5)), &tuning), 1);
        assert_eq!(interaction_radius(Some(&Integrity::high()), &tuning), 3);
    }
}
