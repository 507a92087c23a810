//! Interaction Rules
//!
//! Pure rules applied to a pair of agents. Systems copy the relevant
//! components into [`Participant`]s, run the rule, and write the result back.

use bevy_ecs::prelude::*;

use crate::components::agent::{Agent, Integrity, Opinion, Persuasion};
use crate::config::{InteractionModel, Tuning};
use crate::rng::SimRng;

/// Integrity assumed for an agent that carries none under the integrity model
const NEUTRAL_INTEGRITY: f64 = 0.5;

/// Query over every component an interaction can read or change
pub type InteractionQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut Opinion,
        Option<&'static mut Integrity>,
        Option<&'static Persuasion>,
    ),
    With<Agent>,
>;

/// Run one interaction between two live agents and write the outcome back to
/// their components. Returns false if either entity is missing or both are
/// the same agent.
pub fn interact_entities(
    agents: &mut InteractionQuery,
    a: Entity,
    b: Entity,
    model: InteractionModel,
    tuning: &Tuning,
    rng: &mut SimRng,
    is_friend: bool,
) -> bool {
    let Ok([(mut opinion_a, integrity_a, persuasion_a), (mut opinion_b, integrity_b, persuasion_b)]) =
        agents.get_many_mut([a, b])
    else {
        return false;
    };

    let mut left = Participant {
        opinion: *opinion_a,
        integrity: integrity_a.as_deref().copied(),
        persuasion: persuasion_a.copied(),
    };
    let mut right = Participant {
        opinion: *opinion_b,
        integrity: integrity_b.as_deref().copied(),
        persuasion: persuasion_b.copied(),
    };

    interact(model, tuning, rng, &mut left, &mut right, is_friend);

    if *opinion_a != left.opinion {
        *opinion_a = left.opinion;
    }
    if *opinion_b != right.opinion {
        *opinion_b = right.opinion;
    }
    if let (Some(mut current), Some(updated)) = (integrity_a, left.integrity) {
        *current = updated;
    }
    if let (Some(mut current), Some(updated)) = (integrity_b, right.integrity) {
        *current = updated;
    }
    true
}

/// Interaction-relevant state of one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Participant {
    pub opinion: Opinion,
    pub integrity: Option<Integrity>,
    pub persuasion: Option<Persuasion>,
}

impl Participant {
    pub fn new(opinion: Opinion) -> Self {
        Self {
            opinion,
            integrity: None,
            persuasion: None,
        }
    }

    pub fn with_integrity(mut self, integrity: Integrity) -> Self {
        self.integrity = Some(integrity);
        self
    }

    pub fn with_persuasion(mut self, persuasion: Persuasion) -> Self {
        self.persuasion = Some(persuasion);
        self
    }

    /// High-integrity agents never change opinion.
    pub fn is_fixed(&self) -> bool {
        self.integrity.is_some_and(|i| i.is_high())
    }

    fn integrity_value(&self) -> f64 {
        self.integrity.map_or(NEUTRAL_INTEGRITY, |i| i.value())
    }

    fn adopt(&mut self, opinion: Opinion) {
        if !self.is_fixed() {
            self.opinion = opinion;
        }
    }
}

/// Effect multiplier for friend interactions.
fn dampening(tuning: &Tuning, is_friend: bool) -> f64 {
    if is_friend {
        tuning.friend_dampening
    } else {
        1.0
    }
}

/// Run one interaction between `a` (the initiator) and `b`.
pub fn interact(
    model: InteractionModel,
    tuning: &Tuning,
    rng: &mut SimRng,
    a: &mut Participant,
    b: &mut Participant,
    is_friend: bool,
) {
    match model {
        InteractionModel::Plain => plain_interact(tuning, rng, a, b, is_friend),
        InteractionModel::Integrity => integrity_interact(tuning, rng, a, b, is_friend),
        InteractionModel::Persuasion => persuade(tuning, rng, a, b, is_friend),
    }
}

/// Integrity-weighted exchange.
///
/// One shared coin decides whether the contact was positive. Both integrities
/// are updated first; adoption then uses the updated integrities against the
/// opinions held before the interaction.
pub fn integrity_interact(
    tuning: &Tuning,
    rng: &mut SimRng,
    a: &mut Participant,
    b: &mut Participant,
    is_friend: bool,
) {
    let damp = dampening(tuning, is_friend);
    let positive = rng.chance(tuning.positive_probability);
    let same_opinion = a.opinion == b.opinion;
    let strength = tuning.integrity_strength * damp;

    for side in [&mut *a, &mut *b] {
        if let Some(integrity) = side.integrity.as_mut() {
            // Agreeable contact with a like mind, or hostile contact with an
            // opponent, both reinforce conviction.
            if same_opinion == positive {
                integrity.strengthen(strength);
            } else {
                integrity.weaken(strength);
            }
        }
    }

    if same_opinion {
        return;
    }

    let (opinion_a, opinion_b) = (a.opinion, b.opinion);
    let (integrity_a, integrity_b) = (a.integrity_value(), b.integrity_value());

    if !a.is_fixed() {
        let p = (1.0 - integrity_a) * integrity_b * tuning.adoption_scale * damp;
        if rng.chance(p) {
            a.adopt(opinion_b);
        }
    }
    if !b.is_fixed() {
        let p = (1.0 - integrity_b) * integrity_a * tuning.adoption_scale * damp;
        if rng.chance(p) {
            b.adopt(opinion_a);
        }
    }
}

/// Coin-flip exchange: `a` may adopt `b`'s opinion, then `b` may adopt `a`'s
/// if they still differ.
pub fn plain_interact(
    tuning: &Tuning,
    rng: &mut SimRng,
    a: &mut Participant,
    b: &mut Participant,
    is_friend: bool,
) {
    let p = tuning.plain_adoption * dampening(tuning, is_friend);
    if a.opinion != b.opinion && rng.chance(p) {
        a.adopt(b.opinion);
    }
    if a.opinion != b.opinion && rng.chance(p) {
        b.adopt(a.opinion);
    }
}

/// Directed persuasion: `a` converts `b` with probability
/// `a.influence_strength * b.openness`.
pub fn persuade(
    tuning: &Tuning,
    rng: &mut SimRng,
    a: &mut Participant,
    b: &mut Participant,
    is_friend: bool,
) {
    let (Some(source), Some(target)) = (a.persuasion, b.persuasion) else {
        return;
    };
    let p = source.influence_strength * target.openness * dampening(tuning, is_friend);
    if rng.unit() < p {
        b.adopt(a.opinion);
    }
}
