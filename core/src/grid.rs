//! Square cell grid stored as a flat arena
//!
//! Cell `(x, y)` lives at index `x * size + y`. A grid is produced by
//! [`crate::MazeGenerator`] and owned by [`crate::GridEnvironment`] for the
//! duration of one episode.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Grid coordinate. `x` is the row of the backing buffer, `y` the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`, saturating at `u32::MAX`.
    pub fn manhattan(self, other: Position) -> u32 {
        let dist = self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y));
        u32::try_from(dist).unwrap_or(u32::MAX)
    }
}

/// What occupies a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    Passage,
    Wall,
    Coin,
}

impl CellState {
    /// Matrix code used by snapshots: 0 = passage, 1 = wall, 2 = coin.
    pub const fn code(self) -> u8 {
        match self {
            CellState::Passage => 0,
            CellState::Wall => 1,
            CellState::Coin => 2,
        }
    }

    pub const fn is_walkable(self) -> bool {
        !matches!(self, CellState::Wall)
    }
}

/// A single grid cell. Position is implied by its index in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub state: CellState,
    pub visited: bool,
}

impl Cell {
    const WALL: Cell = Cell {
        state: CellState::Wall,
        visited: false,
    };
}

/// Square grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    seed: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid of `size * size` walls.
    pub(crate) fn walls(size: usize, seed: u32) -> Self {
        Self {
            size,
            seed,
            cells: vec![Cell::WALL; size * size],
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Seed the grid was generated from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The bottom-right corner, `(size - 1, size - 1)`.
    pub fn exit(&self) -> Position {
        Position::new(self.size - 1, self.size - 1)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        (pos.x < self.size && pos.y < self.size).then(|| pos.x * self.size + pos.y)
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub(crate) fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        let i = self.index(pos)?;
        Some(&mut self.cells[i])
    }

    /// State at `pos`, or `None` outside the grid.
    pub fn state(&self, pos: Position) -> Option<CellState> {
        self.cell(pos).map(|c| c.state)
    }

    pub(crate) fn set_state(&mut self, pos: Position, state: CellState) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.state = state;
        }
    }

    /// In bounds and not a wall.
    pub fn is_open(&self, pos: Position) -> bool {
        self.state(pos).is_some_and(CellState::is_walkable)
    }

    /// The in-bounds cell reached from `pos` by `(dx, dy)`.
    pub fn offset(&self, pos: Position, (dx, dy): (i32, i32)) -> Option<Position> {
        let x = pos.x.checked_add_signed(dx as isize)?;
        let y = pos.y.checked_add_signed(dy as isize)?;
        (x < self.size && y < self.size).then_some(Position { x, y })
    }

    /// Number of in-bounds cardinal neighbours that are walls. The grid edge
    /// does not count.
    pub fn wall_neighbors(&self, pos: Position) -> usize {
        Action::ALL
            .iter()
            .filter_map(|a| self.offset(pos, a.offset()))
            .filter(|&n| self.state(n) == Some(CellState::Wall))
            .count()
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |x| (0..self.size).map(move |y| Position { x, y }))
    }

    /// Positions currently holding a coin, row-major.
    pub fn coin_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions()
            .filter(|&p| self.state(p) == Some(CellState::Coin))
    }

    pub fn coin_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.state == CellState::Coin)
            .count()
    }

    pub(crate) fn clear_visited(&mut self) {
        for cell in &mut self.cells {
            cell.visited = false;
        }
    }

    /// Whether every walkable cell can be reached from `(0, 0)` through
    /// 4-connected walkable cells.
    pub fn is_fully_connected(&self) -> bool {
        if !self.is_open(Position::ORIGIN) {
            return false;
        }

        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([Position::ORIGIN]);
        seen[0] = true;
        let mut reached = 1;

        while let Some(pos) = queue.pop_front() {
            for action in Action::ALL {
                let Some(next) = self.offset(pos, action.offset()) else {
                    continue;
                };
                let idx = next.x * self.size + next.y;
                if !seen[idx] && self.cells[idx].state.is_walkable() {
                    seen[idx] = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }

        let walkable = self
            .cells
            .iter()
            .filter(|c| c.state.is_walkable())
            .count();
        reached == walkable
    }

    /// Rows of matrix codes (see [`CellState::code`]), `matrix[x][y]`.
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.size)
            .map(|row| row.iter().map(|c| c.state.code()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_row_grid() -> Grid {
        // 3x3: row 0 open, rest walls
        let mut grid = Grid::walls(3, 1);
        for y in 0..3 {
            grid.set_state(Position::new(0, y), CellState::Passage);
        }
        grid
    }

    #[test]
    fn test_walls_constructor() {
        let grid = Grid::walls(4, 9);
        assert_eq!(grid.size(), 4);
        assert_eq!(grid.seed(), 9);
        assert_eq!(grid.exit(), Position::new(3, 3));
        assert!(grid.positions().all(|p| grid.state(p) == Some(CellState::Wall)));
        assert_eq!(grid.positions().count(), 16);
    }

    #[test]
    fn test_out_of_bounds_lookup() {
        let grid = Grid::walls(3, 1);
        assert!(grid.cell(Position::new(3, 0)).is_none());
        assert!(grid.cell(Position::new(0, 3)).is_none());
        assert!(!grid.is_open(Position::new(5, 5)));
    }

    #[test]
    fn test_offset_stays_in_bounds() {
        let grid = Grid::walls(3, 1);
        assert_eq!(grid.offset(Position::ORIGIN, (-1, 0)), None);
        assert_eq!(grid.offset(Position::ORIGIN, (0, -1)), None);
        assert_eq!(grid.offset(Position::new(2, 2), (1, 0)), None);
        assert_eq!(
            grid.offset(Position::new(1, 1), (1, 0)),
            Some(Position::new(2, 1))
        );
    }

    #[test]
    fn test_wall_neighbors_ignore_edges() {
        let mut grid = Grid::walls(3, 1);
        grid.set_state(Position::new(1, 1), CellState::Passage);
        grid.set_state(Position::new(0, 1), CellState::Passage);

        assert_eq!(grid.wall_neighbors(Position::new(1, 1)), 3);
        // (0,1) sits on the edge: only (0,0) and (0,2) are walls
        assert_eq!(grid.wall_neighbors(Position::new(0, 1)), 2);
        // Corner with one open neighbour
        assert_eq!(grid.wall_neighbors(Position::new(0, 0)), 1);

        let row = open_row_grid();
        assert_eq!(row.wall_neighbors(Position::new(0, 0)), 1);
        assert_eq!(row.wall_neighbors(Position::new(0, 1)), 1);
    }

    #[test]
    fn test_connectivity() {
        let mut grid = open_row_grid();
        assert!(grid.is_fully_connected());

        grid.set_state(Position::new(2, 2), CellState::Passage);
        assert!(!grid.is_fully_connected());

        grid.set_state(Position::new(1, 2), CellState::Coin);
        assert!(grid.is_fully_connected());
    }

    #[test]
    fn test_matrix_codes() {
        let mut grid = open_row_grid();
        grid.set_state(Position::new(0, 2), CellState::Coin);

        assert_eq!(
            grid.to_matrix(),
            vec![vec![0, 0, 2], vec![1, 1, 1], vec![1, 1, 1]]
        );
        assert_eq!(grid.coin_count(), 1);
        assert_eq!(
            grid.coin_positions().collect::<Vec<_>>(),
            vec![Position::new(0, 2)]
        );
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Position::new(1, 4).manhattan(Position::new(3, 1)), 5);
        assert_eq!(Position::ORIGIN.manhattan(Position::ORIGIN), 0);
        assert_eq!(
            Position::ORIGIN.manhattan(Position::new(usize::MAX, usize::MAX)),
            u32::MAX
        );
    }
}
