//! Grid / Occupancy Store
//!
//! A width x height lattice where each cell holds at most one agent.

use bevy_ecs::prelude::*;

use super::agent::Position;

/// Square or diamond-shaped neighbourhood used by the spatial scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// Every cell with `max(|dx|, |dy|) <= r`
    #[default]
    Moore,
    /// Every cell with `|dx| + |dy| <= r`
    VonNeumann,
}

impl Neighborhood {
    fn includes(self, dx: i32, dy: i32, radius: i32) -> bool {
        match self {
            Neighborhood::Moore => true,
            Neighborhood::VonNeumann => dx.abs() + dy.abs() <= radius,
        }
    }
}

/// Resource: occupancy index from cell to agent entity
#[derive(Resource, Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    /// Row-major, `cells[y * width + x]`
    cells: Vec<Option<Entity>>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid must be at least 1x1, got {}x{}", width, height);
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            self.in_bounds(pos),
            "cell ({}, {}) is outside the {}x{} grid",
            pos.x,
            pos.y,
            self.width,
            self.height
        );
        (pos.y * self.width + pos.x) as usize
    }

    /// Agent standing on an in-bounds cell.
    ///
    /// # Panics
    /// If `pos` is outside the grid.
    pub fn occupant(&self, pos: Position) -> Option<Entity> {
        self.cells[self.index(pos)]
    }

    /// # Panics
    /// If `pos` is outside the grid.
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupant(pos).is_some()
    }

    /// Place an agent. Fails without effect when the cell is out of bounds
    /// or taken.
    pub fn add(&mut self, entity: Entity, pos: Position) -> bool {
        if !self.validate_move(pos) {
            return false;
        }
        let idx = self.index(pos);
        self.cells[idx] = Some(entity);
        true
    }

    /// Free the cell if it holds `entity`. No-op otherwise.
    pub fn remove(&mut self, entity: Entity, pos: Position) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        if self.cells[idx] == Some(entity) {
            self.cells[idx] = None;
        }
    }

    /// True iff `pos` is inside the grid and empty.
    pub fn validate_move(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cells[self.index(pos)].is_none()
    }

    /// Move `entity` from `*position` to `to`, updating both the index and
    /// the stored position. On rejection nothing changes.
    pub fn move_agent(&mut self, entity: Entity, position: &mut Position, to: Position) -> bool {
        if !self.validate_move(to) {
            return false;
        }
        let from = self.index(*position);
        debug_assert_eq!(self.cells[from], Some(entity), "grid out of sync at {:?}", position);
        let dest = self.index(to);
        self.cells[from] = None;
        self.cells[dest] = Some(entity);
        *position = to;
        true
    }

    /// All unoccupied cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        let mut empty = Vec::with_capacity(self.cells.len());
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cells[(y * self.width + x) as usize].is_none() {
                    empty.push(Position::new(x, y));
                }
            }
        }
        empty
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupants within `radius` of `center`, excluding `center` itself.
    ///
    /// Scan order is `dx` outer, `dy` inner, both ascending from `-radius`.
    pub fn occupants_within(
        &self,
        center: Position,
        radius: u32,
        shape: Neighborhood,
    ) -> Vec<Entity> {
        let r = radius as i32;
        let mut found = Vec::new();
        for dx in -r..=r {
            for dy in -r..=r {
                if (dx == 0 && dy == 0) || !shape.includes(dx, dy, r) {
                    continue;
                }
                let pos = center.offset(dx, dy);
                if !self.in_bounds(pos) {
                    continue;
                }
                if let Some(entity) = self.occupant(pos) {
                    found.push(entity);
                }
            }
        }
        found
    }

    /// Every occupied cell with its agent, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, Entity)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|e| {
                let i = i as i32;
                (Position::new(i % self.width, i / self.width), e)
            })
        })
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
    fn test_add_rejects_taken_and_out_of_bounds() {
        let e = entities(2);
        let mut grid = Grid::new(5, 5);

        assert!(grid.add(e[0], Position::new(1, 1)));
        assert!(!grid.add(e[1], Position::new(1, 1)));
        assert!(!grid.add(e[1], Position::new(5, 0)));
        assert!(!grid.add(e[1], Position::new(-1, 2)));
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.occupant(Position::new(1, 1)), Some(e[0]));
    }

    #[test]
    fn test_move_success_updates_both_sides() {
        let e = entities(1);
        let mut grid = Grid::new(5, 5);
        let mut pos = Position::new(2, 2);
        grid.add(e[0], pos);

        assert!(grid.move_agent(e[0], &mut pos, Position::new(3, 2)));
        assert_eq!(pos, Position::new(3, 2));
        assert!(!grid.is_occupied(Position::new(2, 2)));
        assert_eq!(grid.occupant(Position::new(3, 2)), Some(e[0]));
    }

    #[test]
    fn test_rejected_move_leaves_state_untouched() {
        let e = entities(2);
        let mut grid = Grid::new(4, 4);
        let mut pos = Position::new(0, 0);
        grid.add(e[0], pos);
        grid.add(e[1], Position::new(1, 0));

        assert!(!grid.move_agent(e[0], &mut pos, Position::new(1, 0)));
        assert!(!grid.move_agent(e[0], &mut pos, Position::new(-1, 0)));
        assert!(!grid.move_agent(e[0], &mut pos, Position::new(0, 4)));

        assert_eq!(pos, Position::new(0, 0));
        assert_eq!(grid.occupant(Position::new(0, 0)), Some(e[0]));
        assert_eq!(grid.occupant(Position::new(1, 0)), Some(e[1]));
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn test_remove_only_frees_own_cell() {
        let e = entities(2);
        let mut grid = Grid::new(3, 3);
        grid.add(e[0], Position::new(0, 0));

        grid.remove(e[1], Position::new(0, 0));
        assert!(grid.is_occupied(Position::new(0, 0)));

        grid.remove(e[0], Position::new(0, 0));
        assert!(!grid.is_occupied(Position::new(0, 0)));

        grid.remove(e[0], Position::new(10, 10));
    }

    #[test]
    fn test_empty_cells_row_major() {
        let e = entities(1);
        let mut grid = Grid::new(3, 2);
        grid.add(e[0], Position::new(1, 0));

        let empty = grid.empty_cells();
        assert_eq!(empty.len(), 5);
        assert_eq!(empty[0], Position::new(0, 0));
        assert_eq!(empty[1], Position::new(2, 0));
        assert_eq!(empty[2], Position::new(0, 1));
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_query_panics() {
        let grid = Grid::new(3, 3);
        grid.occupant(Position::new(3, 0));
    }

    #[test]
    fn test_occupants_within_shapes() {
        let e = entities(3);
        let mut grid = Grid::new(7, 7);
        let center = Position::new(3, 3);
        grid.add(e[0], center);
        grid.add(e[1], Position::new(4, 4));
        grid.add(e[2], Position::new(3, 5));

        assert_eq!(grid.occupants_within(center, 0, Neighborhood::Moore), vec![]);
        assert_eq!(grid.occupants_within(center, 1, Neighborhood::Moore), vec![e[1]]);
        assert_eq!(grid.occupants_within(center, 1, Neighborhood::VonNeumann), vec![]);
        assert_eq!(
            grid.occupants_within(center, 2, Neighborhood::VonNeumann),
            vec![e[2], e[1]]
        );
    }

    #[test]
    fn test_occupants_within_clips_at_edges() {
        let e = entities(2);
        let mut grid = Grid::new(3, 3);
        grid.add(e[0], Position::new(0, 0));
        grid.add(e[1], Position::new(2, 2));

        let found = grid.occupants_within(Position::new(0, 0), 3, Neighborhood::Moore);
        assert_eq!(found, vec![e[1]]);
    }
}
