//! Structure Layout
//!
//! Static partition of the grid into home, work, school and leisure zones.
//! Built once from the grid dimensions and never mutated.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::agent::{Occupation, Position};
use crate::rng::SimRng;

/// Kind of structure a zone represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Home,
    Work,
    School,
    Leisure,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 4] = [
        ZoneKind::Home,
        ZoneKind::Work,
        ZoneKind::School,
        ZoneKind::Leisure,
    ];

    /// Number of separate groups of this kind in every layout.
    pub fn group_count(self) -> usize {
        match self {
            ZoneKind::Home => 12,
            ZoneKind::Work => 6,
            ZoneKind::School => 6,
            ZoneKind::Leisure => 8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoneKind::Home => "home",
            ZoneKind::Work => "work",
            ZoneKind::School => "school",
            ZoneKind::Leisure => "leisure",
        }
    }
}

/// Reference to one group of a zone kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId {
    pub kind: ZoneKind,
    pub group: usize,
}

impl ZoneId {
    pub fn new(kind: ZoneKind, group: usize) -> Self {
        Self { kind, group }
    }
}

/// A rectangular block of cells; `x_max`/`y_max` are exclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub id: ZoneId,
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl Zone {
    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }

    pub fn len(&self) -> usize {
        (self.width().max(0) * self.height().max(0)) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x_min && pos.x < self.x_max && pos.y >= self.y_min && pos.y < self.y_max
    }

    /// The `i`-th cell in row-major order.
    fn cell_at(&self, i: usize) -> Position {
        let w = self.width() as usize;
        Position::new(self.x_min + (i % w) as i32, self.y_min + (i / w) as i32)
    }

    fn index_of(&self, pos: Position) -> usize {
        ((pos.y - self.y_min) * self.width() + (pos.x - self.x_min)) as usize
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> Vec<Position> {
        (0..self.len()).map(|i| self.cell_at(i)).collect()
    }

    /// Mean x and y over the zone's cells.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let cx = f64::from(self.x_min + self.x_max - 1) / 2.0;
        let cy = f64::from(self.y_min + self.y_max - 1) / 2.0;
        Some((cx, cy))
    }

    /// Uniformly random cell of this zone other than `current`.
    pub fn random_other_cell(&self, current: Position, rng: &mut SimRng) -> Option<Position> {
        let n = self.len();
        if !self.contains(current) {
            return if n == 0 { None } else { Some(self.cell_at(rng.between(0, n - 1))) };
        }
        if n < 2 {
            return None;
        }
        let skip = self.index_of(current);
        let mut pick = rng.between(0, n - 2);
        if pick >= skip {
            pick += 1;
        }
        Some(self.cell_at(pick))
    }
}

/// Columns and rows of the coarse tile lattice zones are placed on
const TILE_COLUMNS: i32 = 8;
const TILE_ROWS: i32 = 4;

/// Hand-placed zone kinds, one per tile. Homes line the top and bottom bands,
/// workplaces and schools sit in the middle, leisure fills the east side.
const BLUEPRINT: [[ZoneKind; TILE_COLUMNS as usize]; TILE_ROWS as usize] = {
    use ZoneKind::*;
    [
        [Home, Home, Home, Home, Home, Home, Leisure, Leisure],
        [Work, Work, Work, School, School, School, Leisure, Leisure],
        [Work, Work, Work, School, School, School, Leisure, Leisure],
        [Home, Home, Home, Home, Home, Home, Leisure, Leisure],
    ]
};

/// Resource: all zones, grouped by kind
#[derive(Resource, Debug, Clone, Default)]
pub struct StructureLayout {
    zones: BTreeMap<ZoneKind, Vec<Zone>>,
}

impl StructureLayout {
    /// Place one square block per blueprint tile, centred in the tile and
    /// clipped to the grid. Blocks never leave their tile, so no two zones
    /// overlap.
    pub fn for_grid(width: i32, height: i32) -> Self {
        let tile_w = (width / TILE_COLUMNS).max(1);
        let tile_h = (height / TILE_ROWS).max(1);
        let side = (tile_w.min(tile_h) - 2).max(1);

        let mut zones: BTreeMap<ZoneKind, Vec<Zone>> = BTreeMap::new();
        for (row, kinds) in BLUEPRINT.iter().enumerate() {
            for (col, kind) in kinds.iter().enumerate() {
                let x0 = col as i32 * tile_w + (tile_w - side) / 2;
                let y0 = row as i32 * tile_h + (tile_h - side) / 2;
                let groups = zones.entry(*kind).or_default();
                let id = ZoneId::new(*kind, groups.len());
                groups.push(Zone {
                    id,
                    x_min: x0.min(width),
                    y_min: y0.min(height),
                    x_max: (x0 + side).min(width),
                    y_max: (y0 + side).min(height),
                });
            }
        }

        Self { zones }
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id.kind).and_then(|groups| groups.get(id.group))
    }

    pub fn groups(&self, kind: ZoneKind) -> &[Zone] {
        self.zones.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn all_zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values().flatten()
    }

    /// Zone covering a cell, if any.
    pub fn zone_at(&self, pos: Position) -> Option<&Zone> {
        self.all_zones().find(|z| z.contains(pos))
    }

    /// Round-robin zone assignment by construction index:
    /// (home, work-or-school, leisure).
    pub fn assignment_for(&self, index: u32, occupation: Occupation) -> (ZoneId, ZoneId, ZoneId) {
        let pick = |kind: ZoneKind| {
            let count = self.groups(kind).len().max(1);
            ZoneId::new(kind, index as usize % count)
        };
        (
            pick(ZoneKind::Home),
            pick(occupation.daytime_zone()),
            pick(ZoneKind::Leisure),
        )
    }
}
