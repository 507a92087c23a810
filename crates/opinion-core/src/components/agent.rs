//! Agent Components
//!
//! Components for individual agents: position, opinion, integrity, routine.
//! Model variants are expressed by which optional components an agent carries.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use super::structure::{ZoneId, ZoneKind};

/// Length of one simulated day in steps
pub const DAY_LENGTH: u64 = 120;

/// Marker component identifying an entity as an agent
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Agent;

/// Construction index, assigned in creation order and never reused
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentIndex(pub u32);

/// A cell coordinate on the grid
///
/// Signed so that a proposed step off the edge is representable and can be
/// rejected by the grid.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four axis-aligned neighbours, in east, west, south, north order.
    pub fn neighbors4(self) -> [Position; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    pub fn chebyshev_distance(self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Categorical opinion held by an agent
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Opinion(pub u8);

impl Opinion {
    /// Number of distinct opinions
    pub const COUNT: u8 = 3;

    /// Every opinion value in ascending order.
    pub fn all() -> impl Iterator<Item = Opinion> {
        (0..Self::COUNT).map(Opinion)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Resistance to influence and, symmetrically, persuasive strength
///
/// `value` is always within [0.0, 1.0]. High-integrity agents are pinned at 1.0
/// and ignore every update.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Integrity {
    value: f64,
    high: bool,
}

impl Integrity {
    pub fn new(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            high: false,
        }
    }

    /// A fixed, maximally persuasive integrity of 1.0.
    pub fn high() -> Self {
        Self {
            value: 1.0,
            high: true,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Move toward 1.0 by `strength` of the remaining gap.
    pub fn strengthen(&mut self, strength: f64) {
        if self.high {
            return;
        }
        self.value = (self.value + strength * (1.0 - self.value)).min(1.0);
    }

    /// Move toward 0.0 by `strength` of the current value.
    pub fn weaken(&mut self, strength: f64) {
        if self.high {
            return;
        }
        self.value = (self.value - strength * self.value).max(0.0);
    }

    /// Spatial reach: `floor(value * max_radius)`, capped at `max_radius`.
    pub fn interaction_radius(&self, max_radius: u32) -> u32 {
        let scaled = (self.value * f64::from(max_radius)).floor();
        (scaled.max(0.0) as u32).min(max_radius)
    }
}

/// Directed persuasion traits
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Persuasion {
    /// How persuasive this agent is (0.5 to 1.0 when drawn)
    pub influence_strength: f64,
    /// How willing this agent is to change (0.1 to 0.9 when drawn)
    pub openness: f64,
}

impl Persuasion {
    pub fn new(influence_strength: f64, openness: f64) -> Self {
        Self {
            influence_strength: influence_strength.clamp(0.0, 1.0),
            openness: openness.clamp(0.0, 1.0),
        }
    }
}

/// Which daytime structure an agent commutes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupation {
    Student,
    Worker,
}

impl Occupation {
    pub fn daytime_zone(self) -> ZoneKind {
        match self {
            Occupation::Student => ZoneKind::School,
            Occupation::Worker => ZoneKind::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Occupation::Student => "student",
            Occupation::Worker => "worker",
        }
    }
}

/// Part of the day, derived from the step counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    Morning,
    CommuteOut,
    Daytime,
    Leisure,
    CommuteBack,
    Night,
}

impl DayPhase {
    /// Phase for a given absolute step.
    pub fn at(step: u64) -> Self {
        match step % DAY_LENGTH {
            0..=9 => DayPhase::Morning,
            10..=19 => DayPhase::CommuteOut,
            20..=79 => DayPhase::Daytime,
            80..=99 => DayPhase::Leisure,
            100..=109 => DayPhase::CommuteBack,
            _ => DayPhase::Night,
        }
    }

    /// Zone kind targeted during this phase.
    pub fn target(self, occupation: Occupation) -> ZoneKind {
        match self {
            DayPhase::Morning | DayPhase::CommuteBack | DayPhase::Night => ZoneKind::Home,
            DayPhase::CommuteOut | DayPhase::Daytime => occupation.daytime_zone(),
            DayPhase::Leisure => ZoneKind::Leisure,
        }
    }
}

/// Daily routine for schedule-directed movement
///
/// Zone assignments are fixed at construction; `phase` is recomputed from the
/// step counter at the start of every movement pass.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routine {
    pub occupation: Occupation,
    pub home: ZoneId,
    pub daytime: ZoneId,
    pub leisure: ZoneId,
    pub phase: DayPhase,
}

impl Routine {
    pub fn new(occupation: Occupation, home: ZoneId, daytime: ZoneId, leisure: ZoneId) -> Self {
        Self {
            occupation,
            home,
            daytime,
            leisure,
            phase: DayPhase::Morning,
        }
    }

    pub fn update_phase(&mut self, step: u64) {
        self.phase = DayPhase::at(step);
    }

    /// Kind of zone the agent is heading for.
    pub fn target_kind(&self) -> ZoneKind {
        self.phase.target(self.occupation)
    }

    /// The assigned zone the agent is heading for.
    pub fn target(&self) -> ZoneId {
        match self.target_kind() {
            ZoneKind::Home => self.home,
            ZoneKind::Work | ZoneKind::School => self.daytime,
            ZoneKind::Leisure => self.leisure,
        }
    }
}
