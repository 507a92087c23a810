//! Simulation Engine
//!
//! `Environment` owns the ECS world and the tick schedule. It is the only
//! place agents are created or removed, which keeps the grid, the population
//! list and the social graph in step with the entities themselves.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use bevy_ecs::system::SystemState;
use tracing::debug;

use crate::components::agent::{
    Agent, AgentIndex, Integrity, Occupation, Opinion, Persuasion, Position, Routine,
};
use crate::components::grid::Grid;
use crate::components::population::{Population, SimClock};
use crate::components::social::SocialGraph;
use crate::components::structure::{StructureLayout, ZoneId};
use crate::config::{DynamicsConfig, InteractionModel, MovementModel, SimConfig, Tuning};
use crate::output::stats::{record_distribution, OpinionDistribution, OpinionHistory};
use crate::rng::SimRng;
use crate::systems::{
    advance_clock, interact_entities, movement_pass, social_pass, social_pass_enabled,
    spatial_pass, InteractionQuery,
};

/// Requested properties of a new agent
///
/// Anything left unset is drawn from the shared random stream when the agent
/// is added, within the configured tuning ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSpec {
    pub position: Position,
    pub opinion: Opinion,
    pub integrity: Option<f64>,
    pub high_integrity: bool,
    pub persuasion: Option<Persuasion>,
    pub occupation: Option<Occupation>,
}

impl AgentSpec {
    pub fn new(position: Position, opinion: Opinion) -> Self {
        Self {
            position,
            opinion,
            integrity: None,
            high_integrity: false,
            persuasion: None,
            occupation: None,
        }
    }

    pub fn with_integrity(mut self, value: f64) -> Self {
        self.integrity = Some(value);
        self
    }

    pub fn high_integrity(mut self) -> Self {
        self.high_integrity = true;
        self
    }

    pub fn with_persuasion(mut self, persuasion: Persuasion) -> Self {
        self.persuasion = Some(persuasion);
        self
    }

    pub fn with_occupation(mut self, occupation: Occupation) -> Self {
        self.occupation = Some(occupation);
        self
    }
}

/// Read-only view of one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentView {
    pub entity: Entity,
    pub index: u32,
    pub position: Position,
    pub opinion: Opinion,
    pub integrity: Option<f64>,
    pub high_integrity: bool,
    pub persuasion: Option<Persuasion>,
    pub occupation: Option<Occupation>,
    pub target: Option<ZoneId>,
}

/// Parameters of a single out-of-schedule interaction
type InteractionParams = (
    InteractionQuery<'static, 'static>,
    ResMut<'static, SimRng>,
    Res<'static, DynamicsConfig>,
    Res<'static, Tuning>,
);

/// The grid world, its agents and the per-tick schedule
pub struct Environment {
    world: World,
    schedule: Schedule,
    interaction_state: SystemState<InteractionParams>,
}

impl Environment {
    /// Build an empty environment. Agents are added separately, usually via
    /// [`crate::setup::populate`].
    ///
    /// # Panics
    /// If the configured grid is smaller than 1x1.
    pub fn new(config: &SimConfig) -> Self {
        let (width, height) = (config.world.width, config.world.height);

        let mut world = World::new();
        world.insert_resource(SimRng::seeded(config.seed));
        world.insert_resource(Grid::new(width, height));
        world.insert_resource(StructureLayout::for_grid(width, height));
        world.insert_resource(Population::new());
        world.insert_resource(SocialGraph::new());
        world.insert_resource(SimClock::default());
        world.insert_resource(OpinionHistory::new());
        world.insert_resource(config.dynamics.clone());
        world.insert_resource(config.tuning.clone());

        let interaction_state = SystemState::new(&mut world);

        debug!(width, height, seed = config.seed, "environment created");
        Self {
            world,
            schedule: build_schedule(),
            interaction_state,
        }
    }

    /// Default dynamics and tuning on a `width` x `height` grid.
    pub fn with_defaults(width: i32, height: i32, seed: u64) -> Self {
        let mut config = SimConfig {
            seed,
            ..SimConfig::default()
        };
        config.world.width = width;
        config.world.height = height;
        Self::new(&config)
    }

    /// Create an agent on an empty in-bounds cell. Returns `None` without any
    /// effect if the cell is unavailable.
    ///
    /// Integrity is attached only under the integrity model, persuasion
    /// traits only under the persuasion model and a routine only under
    /// scheduled movement.
    pub fn add_agent(&mut self, spec: AgentSpec) -> Option<Entity> {
        if !self.grid().validate_move(spec.position) {
            return None;
        }
        let dynamics = self.dynamics().clone();
        let tuning = self.tuning().clone();
        let index = self.world.resource_mut::<Population>().allocate_index();

        let entity = self
            .world
            .spawn((Agent, AgentIndex(index), spec.position, spec.opinion))
            .id();

        match dynamics.interaction {
            InteractionModel::Integrity => {
                let integrity = if spec.high_integrity {
                    Integrity::high()
                } else {
                    let value = match spec.integrity {
                        Some(value) => value,
                        None => self.rng_mut().uniform(
                            tuning.initial_integrity_min,
                            tuning.initial_integrity_max,
                        ),
                    };
                    Integrity::new(value)
                };
                self.world.entity_mut(entity).insert(integrity);
            }
            InteractionModel::Persuasion => {
                let persuasion = match spec.persuasion {
                    Some(persuasion) => persuasion,
                    None => {
                        let mut rng = self.rng_mut();
                        let influence = rng.uniform(tuning.influence_min, tuning.influence_max);
                        let openness = rng.uniform(tuning.openness_min, tuning.openness_max);
                        Persuasion::new(influence, openness)
                    }
                };
                self.world.entity_mut(entity).insert(persuasion);
            }
            InteractionModel::Plain => {}
        }

        if dynamics.movement == MovementModel::Scheduled {
            let occupation = spec.occupation.unwrap_or_else(|| {
                if self.rng_mut().chance(tuning.student_probability) {
                    Occupation::Student
                } else {
                    Occupation::Worker
                }
            });
            let (home, daytime, leisure) = self.layout().assignment_for(index, occupation);
            let mut routine = Routine::new(occupation, home, daytime, leisure);
            routine.update_phase(self.step_count());
            self.world.entity_mut(entity).insert(routine);
        }

        self.world.resource_mut::<Grid>().add(entity, spec.position);
        self.world.resource_mut::<Population>().push(entity);
        Some(entity)
    }

    /// Remove an agent from the grid, the population and the social graph.
    /// Returns false (and does nothing) if it is not a member.
    pub fn remove_agent(&mut self, entity: Entity) -> bool {
        if !self.world.resource_mut::<Population>().remove(entity) {
            return false;
        }
        if let Some(position) = self.world.get::<Position>(entity).copied() {
            self.world.resource_mut::<Grid>().remove(entity, position);
        }
        self.world.resource_mut::<SocialGraph>().forget(entity);
        self.world.despawn(entity);
        true
    }

    /// Pin an existing agent at integrity 1.0. Only meaningful under the
    /// integrity model; returns false when the agent carries no integrity.
    pub fn make_high_integrity(&mut self, entity: Entity) -> bool {
        match self.world.get_mut::<Integrity>(entity) {
            Some(mut integrity) => {
                *integrity = Integrity::high();
                true
            }
            None => false,
        }
    }

    /// Move an agent through the grid. Rejected moves change nothing.
    pub fn move_agent(&mut self, entity: Entity, to: Position) -> bool {
        let Some(mut position) = self.world.get::<Position>(entity).copied() else {
            return false;
        };
        let moved = self
            .world
            .resource_mut::<Grid>()
            .move_agent(entity, &mut position, to);
        if moved {
            if let Some(mut stored) = self.world.get_mut::<Position>(entity) {
                *stored = position;
            }
        }
        moved
    }

    /// Link two agents as friends. False for self-links, existing ties and
    /// non-members.
    pub fn befriend(&mut self, a: Entity, b: Entity) -> bool {
        let population = self.world.resource::<Population>();
        if !population.contains(a) || !population.contains(b) {
            return false;
        }
        self.world.resource_mut::<SocialGraph>().befriend(a, b)
    }

    /// Run a single interaction between two agents outside the schedule,
    /// using the configured model. Returns false if either is missing.
    pub fn interact(&mut self, a: Entity, b: Entity, is_friend: bool) -> bool {
        let (mut agents, mut rng, dynamics, tuning) =
            self.interaction_state.get_mut(&mut self.world);
        interact_entities(
            &mut agents,
            a,
            b,
            dynamics.interaction,
            &tuning,
            &mut rng,
            is_friend,
        )
    }

    /// Advance one tick: movement, social pass, spatial pass, then the step
    /// counter and the history record.
    pub fn step(&mut self) {
        self.schedule.run(&mut self.world);
    }

    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    pub fn step_count(&self) -> u64 {
        self.world.resource::<SimClock>().step
    }

    pub fn opinion_distribution(&self) -> OpinionDistribution {
        OpinionDistribution::from_opinions(
            self.population()
                .iter()
                .filter_map(|e| self.world.get::<Opinion>(*e)),
        )
    }

    pub fn agent(&self, entity: Entity) -> Option<AgentView> {
        let entity_ref = self.world.get_entity(entity)?;
        let integrity = entity_ref.get::<Integrity>();
        let routine = entity_ref.get::<Routine>();
        Some(AgentView {
            entity,
            index: entity_ref.get::<AgentIndex>()?.0,
            position: *entity_ref.get::<Position>()?,
            opinion: *entity_ref.get::<Opinion>()?,
            integrity: integrity.map(|i| i.value()),
            high_integrity: integrity.is_some_and(|i| i.is_high()),
            persuasion: entity_ref.get::<Persuasion>().copied(),
            occupation: routine.map(|r| r.occupation),
            target: routine.map(|r| r.target()),
        })
    }

    /// Every agent, in current population order.
    pub fn agents(&self) -> impl Iterator<Item = AgentView> + '_ {
        self.population().iter().filter_map(|e| self.agent(*e))
    }

    pub fn population(&self) -> &[Entity] {
        self.world.resource::<Population>().agents()
    }

    pub fn friends_of(&self, entity: Entity) -> Vec<Entity> {
        self.social_graph().friends_of(entity).collect()
    }

    pub fn social_graph(&self) -> &SocialGraph {
        self.world.resource::<SocialGraph>()
    }

    pub fn grid(&self) -> &Grid {
        self.world.resource::<Grid>()
    }

    pub fn width(&self) -> i32 {
        self.grid().width()
    }

    pub fn height(&self) -> i32 {
        self.grid().height()
    }

    pub fn layout(&self) -> &StructureLayout {
        self.world.resource::<StructureLayout>()
    }

    pub fn dynamics(&self) -> &DynamicsConfig {
        self.world.resource::<DynamicsConfig>()
    }

    pub fn tuning(&self) -> &Tuning {
        self.world.resource::<Tuning>()
    }

    /// Per-step distributions recorded so far.
    pub fn history(&self) -> &OpinionHistory {
        self.world.resource::<OpinionHistory>()
    }

    pub fn rng_mut(&mut self) -> Mut<'_, SimRng> {
        self.world.resource_mut::<SimRng>()
    }

    /// Restart the random stream; the world state is left as it is.
    pub fn reseed(&mut self, seed: u64) {
        self.rng_mut().reseed(seed);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

/// The tick, as a strictly ordered single-threaded chain.
fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            movement_pass,
            social_pass.run_if(social_pass_enabled),
            spatial_pass,
            advance_clock,
            record_distribution,
        )
            .chain(),
    );
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(movement: MovementModel, interaction: InteractionModel) -> Environment {
        let mut config = SimConfig::default();
        config.world.width = 20;
        config.world.height = 20;
        config.dynamics.movement = movement;
        config.dynamics.interaction = interaction;
        Environment::new(&config)
    }

    #[test]
    fn test_add_agent_rejects_taken_and_outside_cells() {
        let mut env = Environment::with_defaults(5, 5, 1);
        let first = env.add_agent(AgentSpec::new(Position::new(2, 2), Opinion(0)));
        assert!(first.is_some());
        assert!(env.add_agent(AgentSpec::new(Position::new(2, 2), Opinion(1))).is_none());
        assert!(env.add_agent(AgentSpec::new(Position::new(5, 0), Opinion(1))).is_none());
        assert!(env.add_agent(AgentSpec::new(Position::new(-1, 0), Opinion(1))).is_none());
        assert_eq!(env.population().len(), 1);
        assert_eq!(env.grid().occupied_count(), 1);
    }

    #[test]
    fn test_components_follow_models() {
        let mut integrity_env = env(MovementModel::RandomWalk, InteractionModel::Integrity);
        let a = integrity_env
            .add_agent(AgentSpec::new(Position::new(0, 0), Opinion(0)))
            .unwrap();
        let view = integrity_env.agent(a).unwrap();
        let value = view.integrity.unwrap();
        assert!((0.3..=0.7).contains(&value));
        assert!(view.persuasion.is_none());
        assert!(view.occupation.is_none());

        let mut persuasion_env = env(MovementModel::Scheduled, InteractionModel::Persuasion);
        let b = persuasion_env
            .add_agent(
                AgentSpec::new(Position::new(0, 0), Opinion(1)).with_occupation(Occupation::Student),
            )
            .unwrap();
        let view = persuasion_env.agent(b).unwrap();
        assert!(view.integrity.is_none());
        let persuasion = view.persuasion.unwrap();
        assert!((0.5..=1.0).contains(&persuasion.influence_strength));
        assert!((0.1..=0.9).contains(&persuasion.openness));
        assert_eq!(view.occupation, Some(Occupation::Student));
        assert!(view.target.is_some());

        let mut plain_env = env(MovementModel::RandomWalk, InteractionModel::Plain);
        let c = plain_env
            .add_agent(AgentSpec::new(Position::new(0, 0), Opinion(2)).high_integrity())
            .unwrap();
        let view = plain_env.agent(c).unwrap();
        assert!(view.integrity.is_none());
        assert!(!view.high_integrity);
    }

    #[test]
    fn test_remove_agent_cleans_up_everywhere() {
        let mut env = Environment::with_defaults(5, 5, 1);
        let a = env.add_agent(AgentSpec::new(Position::new(0, 0), Opinion(0))).unwrap();
        let b = env.add_agent(AgentSpec::new(Position::new(1, 0), Opinion(0))).unwrap();
        assert!(env.befriend(a, b));

        assert!(env.remove_agent(a));
        assert!(!env.remove_agent(a));
        assert!(!env.grid().is_occupied(Position::new(0, 0)));
        assert!(env.friends_of(b).is_empty());
        assert_eq!(env.population(), &[b]);
        assert!(env.agent(a).is_none());
    }

    #[test]
    fn test_step_advances_clock_and_history() {
        let mut env = Environment::with_defaults(10, 10, 3);
        for x in 0..5 {
            env.add_agent(AgentSpec::new(Position::new(x, 0), Opinion((x % 3) as u8)));
        }
        env.run(4);
        assert_eq!(env.step_count(), 4);
        let steps: Vec<u64> = env.history().records().iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![1, 2, 3, 4]);
        assert!(env.history().records().iter().all(|r| r.total() == 5));
    }

    #[test]
    fn test_make_high_integrity() {
        let mut env = Environment::with_defaults(5, 5, 1);
        let a = env
            .add_agent(AgentSpec::new(Position::new(0, 0), Opinion(0)).with_integrity(0.4))
            .unwrap();
        assert!(env.make_high_integrity(a));
        let view = env.agent(a).unwrap();
        assert!(view.high_integrity);
        assert_eq!(view.integrity, Some(1.0));
    }

    #[test]
    fn test_interact_reuses_state_across_calls_and_spawns() {
        let mut env = Environment::with_defaults(5, 5, 9);
        let a = env
            .add_agent(AgentSpec::new(Position::new(0, 0), Opinion(0)).with_integrity(0.5))
            .unwrap();
        let b = env
            .add_agent(AgentSpec::new(Position::new(1, 0), Opinion(1)).with_integrity(0.5))
            .unwrap();
        for _ in 0..50 {
            assert!(env.interact(a, b, false));
        }
        assert_ne!(env.agent(a).unwrap().integrity, Some(0.5));

        // Agents spawned after the first call are still visible to it.
        let c = env
            .add_agent(AgentSpec::new(Position::new(2, 0), Opinion(2)).high_integrity())
            .unwrap();
        assert!(env.interact(b, c, true));
        assert!(!env.interact(a, a, false));

        assert!(env.remove_agent(c));
        assert!(!env.interact(b, c, false));
        assert!(env.interact(a, b, true));
    }
}
