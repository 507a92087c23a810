//! Movement System
//!
//! Agents propose a cell, the grid accepts or rejects it. A rejected proposal
//! is not an error: the agent simply stays put this tick.

use bevy_ecs::prelude::*;
use tracing::trace;

use crate::components::agent::{Agent, Position, Routine};
use crate::components::grid::Grid;
use crate::components::population::{Population, SimClock};
use crate::components::structure::StructureLayout;
use crate::config::{DynamicsConfig, MovementModel};
use crate::rng::SimRng;

/// One of the four axis-aligned neighbours, chosen uniformly. No bounds or
/// occupancy check.
pub fn propose_random_step(pos: Position, rng: &mut SimRng) -> Position {
    let options = pos.neighbors4();
    rng.choose(&options).copied().unwrap_or(pos)
}

/// Schedule-directed proposal.
///
/// Inside the target zone: any other cell of that zone (or stay). Outside:
/// one greedy step toward the zone centroid, moving x and y independently so
/// diagonal steps are possible.
pub fn propose_scheduled_step(
    pos: Position,
    routine: &Routine,
    layout: &StructureLayout,
    rng: &mut SimRng,
) -> Position {
    let Some(zone) = layout.zone(routine.target()) else {
        return pos;
    };
    if zone.contains(pos) {
        return zone.random_other_cell(pos, rng).unwrap_or(pos);
    }
    match zone.centroid() {
        Some((cx, cy)) => pos.offset(step_toward(pos.x, cx), step_toward(pos.y, cy)),
        None => pos,
    }
}

fn step_toward(from: i32, to: f64) -> i32 {
    let from = f64::from(from);
    if from < to {
        1
    } else if from > to {
        -1
    } else {
        0
    }
}

/// System: shuffle the population, then let every agent attempt one move.
pub fn movement_pass(
    mut rng: ResMut<SimRng>,
    mut grid: ResMut<Grid>,
    mut population: ResMut<Population>,
    layout: Res<StructureLayout>,
    clock: Res<SimClock>,
    dynamics: Res<DynamicsConfig>,
    mut agents: Query<(&mut Position, Option<&mut Routine>), With<Agent>>,
) {
    let rng = &mut *rng;
    let grid = &mut *grid;
    population.shuffle(rng);

    let mut moved = 0usize;
    for &entity in population.agents() {
        let Ok((mut position, mut routine)) = agents.get_mut(entity) else {
            continue;
        };
        if let Some(routine) = routine.as_mut() {
            routine.update_phase(clock.step);
        }

        let current = *position;
        let success = match (dynamics.movement, routine.as_deref()) {
            (MovementModel::PersistentWalk, _) => {
                let mut options = current.neighbors4();
                rng.shuffle(&mut options);
                options
                    .into_iter()
                    .any(|candidate| grid.move_agent(entity, &mut *position, candidate))
            }
            (MovementModel::Scheduled, Some(routine)) => {
                let proposal = propose_scheduled_step(current, routine, &layout, rng);
                proposal != current && grid.move_agent(entity, &mut *position, proposal)
            }
            _ => {
                let proposal = propose_random_step(current, rng);
                grid.move_agent(entity, &mut *position, proposal)
            }
        };
        if success {
            moved += 1;
        }
    }

    trace!(step = clock.step, moved, "movement pass");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{DayPhase, Occupation};
    use crate::components::structure::{ZoneId, ZoneKind};

    fn routine_for(layout: &StructureLayout, step: u64) -> Routine {
        let (home, daytime, leisure) = layout.assignment_for(0, Occupation::Worker);
        let mut routine = Routine::new(Occupation::Worker, home, daytime, leisure);
        routine.update_phase(step);
        routine
    }

    #[test]
    fn test_random_step_is_adjacent() {
        let mut rng = SimRng::seeded(1);
        let origin = Position::new(0, 0);
        for _ in 0..100 {
            let p = propose_random_step(origin, &mut rng);
            assert_eq!((p.x - origin.x).abs() + (p.y - origin.y).abs(), 1);
        }
    }

    #[test]
    fn test_scheduled_step_heads_for_centroid() {
        let layout = StructureLayout::for_grid(100, 100);
        let routine = routine_for(&layout, 30);
        assert_eq!(routine.phase, DayPhase::Daytime);
        assert_eq!(routine.target(), ZoneId::new(ZoneKind::Work, 0));

        let zone = layout.zone(routine.target()).unwrap().clone();
        let (cx, cy) = zone.centroid().unwrap();
        let mut rng = SimRng::seeded(2);

        let far = Position::new(99, 99);
        let next = propose_scheduled_step(far, &routine, &layout, &mut rng);
        assert_eq!(next, Position::new(98, 98));

        let aligned = Position::new(cx.round() as i32, 99);
        let next = propose_scheduled_step(aligned, &routine, &layout, &mut rng);
        assert_eq!(next.y, 98);
        assert!((next.x - aligned.x).abs() <= 1);
    }

    #[test]
    fn test_scheduled_step_wanders_inside_zone() {
        let layout = StructureLayout::for_grid(100, 100);
        let routine = routine_for(&layout, 85);
        assert_eq!(routine.target_kind(), ZoneKind::Leisure);

        let zone = layout.zone(routine.target()).unwrap();
        let inside = zone.cells()[0];
        let mut rng = SimRng::seeded(3);
        for _ in 0..50 {
            let next = propose_scheduled_step(inside, &routine, &layout, &mut rng);
            assert!(zone.contains(next));
            assert_ne!(next, inside);
        }
    }

    #[test]
    fn test_scheduled_step_reaches_zone() {
        let layout = StructureLayout::for_grid(60, 40);
        let routine = routine_for(&layout, 0);
        let zone = layout.zone(routine.target()).unwrap();
        let mut rng = SimRng::seeded(4);

        let mut pos = Position::new(59, 39);
        for _ in 0..200 {
            if zone.contains(pos) {
                break;
            }
            pos = propose_scheduled_step(pos, &routine, &layout, &mut rng);
        }
        assert!(zone.contains(pos), "never reached home, stopped at {:?}", pos);
    }
}
