//! ECS Systems
//!
//! The three per-tick passes (movement, social, spatial) and the pure rules
//! they apply.

use bevy_ecs::prelude::*;

use crate::components::population::SimClock;

pub mod interaction;
pub mod movement;
pub mod social;
pub mod spatial;

pub use interaction::{interact, interact_entities, InteractionQuery, Participant};
pub use movement::{movement_pass, propose_random_step, propose_scheduled_step};
pub use social::{sample_friends, social_pass, social_pass_enabled};
pub use spatial::{interaction_radius, spatial_pass};

/// Closes the tick.
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}
