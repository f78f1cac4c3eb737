//! Agent movement, collision and coin bookkeeping on a generated grid

use serde::{Deserialize, Serialize};

use crate::action::{Action, MoveResult};
use crate::grid::{CellState, Grid, Position};

/// Serializable view of the grid for display collaborators.
///
/// `matrix[x][y]` holds 0 = passage, 1 = wall, 2 = coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub size: usize,
    pub seed: u32,
    pub agent: Position,
    pub coins_remaining: usize,
    pub nearest_coin: Option<Position>,
    pub matrix: Vec<Vec<u8>>,
}

/// Owns the grid and the agent position for one episode.
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    grid: Grid,
    agent: Position,
}

impl GridEnvironment {
    /// Place the agent at `(0, 0)` on `grid`. The start cell counts as
    /// already visited.
    pub fn new(mut grid: Grid) -> Self {
        grid.clear_visited();
        let mut world = Self {
            grid,
            agent: Position::ORIGIN,
        };
        world.mark_visited_if_new(Position::ORIGIN);
        world
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    /// False outside `[0, size)` or on a wall; true on passages and coins.
    pub fn is_walkable(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.grid.is_open(Position::new(x as usize, y as usize))
    }

    /// Try to move one cell. The position is unchanged when blocked.
    pub fn move_agent(&mut self, action: Action) -> MoveResult {
        let (dx, dy) = action.offset();
        let x = self.agent.x as isize + dx as isize;
        let y = self.agent.y as isize + dy as isize;

        if !self.is_walkable(x, y) {
            return MoveResult::Blocked;
        }

        self.agent = Position::new(x as usize, y as usize);
        MoveResult::Moved
    }

    /// Whether the agent stands on an uncollected coin.
    pub fn touching_coin(&self) -> bool {
        self.grid.state(self.agent) == Some(CellState::Coin)
    }

    /// Convert the coin under the agent into a passage.
    ///
    /// Returns `true` only when a coin was actually collected, so repeated
    /// calls on the same cell never award twice.
    pub fn collect_coin(&mut self) -> bool {
        if !self.touching_coin() {
            return false;
        }
        self.grid.set_state(self.agent, CellState::Passage);
        true
    }

    /// True once no cell holds a coin.
    pub fn all_coins_collected(&self) -> bool {
        self.grid.coin_positions().next().is_none()
    }

    pub fn coins_remaining(&self) -> usize {
        self.grid.coin_count()
    }

    /// Set `visited` on a walkable cell the first time it is entered.
    ///
    /// Returns `false` for walls, out-of-bounds positions and repeat visits.
    pub fn mark_visited_if_new(&mut self, pos: Position) -> bool {
        match self.grid.cell_mut(pos) {
            Some(cell) if cell.state.is_walkable() && !cell.visited => {
                cell.visited = true;
                true
            }
            _ => false,
        }
    }

    /// Closest remaining coin by Manhattan distance, ties broken in row-major
    /// order. `None` when every coin has been collected.
    pub fn nearest_coin(&self) -> Option<(Position, u32)> {
        let mut best: Option<(Position, u32)> = None;
        for coin in self.grid.coin_positions() {
            let dist = self.agent.manhattan(coin);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((coin, dist));
            }
        }
        best
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            size: self.grid.size(),
            seed: self.grid.seed(),
            agent: self.agent,
            coins_remaining: self.coins_remaining(),
            nearest_coin: self.nearest_coin().map(|(pos, _)| pos),
            matrix: self.grid.to_matrix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze_gen::MazeGenerator;

    // x=0 .#.....
    // x=1 .#.#.##
    // x=2 .#c#...
    // x=3 .#####.
    // x=4 .......
    // x=5 ######.
    // x=6 .......
    fn seed_1_world() -> GridEnvironment {
        GridEnvironment::new(MazeGenerator::generate(7, 1, Some(1)).unwrap())
    }

    /// 1x3 corridor along y with coins at both far cells.
    fn two_coin_world() -> GridEnvironment {
        let mut grid = Grid::walls(3, 0);
        grid.set_state(Position::new(0, 0), CellState::Passage);
        grid.set_state(Position::new(0, 1), CellState::Coin);
        grid.set_state(Position::new(0, 2), CellState::Coin);
        GridEnvironment::new(grid)
    }

    #[test]
    fn test_is_walkable() {
        let world = seed_1_world();
        assert!(world.is_walkable(0, 0));
        assert!(world.is_walkable(1, 0));
        assert!(world.is_walkable(2, 2)); // coin
        assert!(!world.is_walkable(0, 1)); // wall
        assert!(!world.is_walkable(-1, 0));
        assert!(!world.is_walkable(0, -1));
        assert!(!world.is_walkable(7, 0));
        assert!(!world.is_walkable(0, 7));
    }

    #[test]
    fn test_blocked_moves_keep_position() {
        let mut world = seed_1_world();

        assert_eq!(world.move_agent(Action::Up), MoveResult::Blocked); // wall at (0,1)
        assert_eq!(world.move_agent(Action::Left), MoveResult::Blocked); // x = -1
        assert_eq!(world.move_agent(Action::Down), MoveResult::Blocked); // y = -1
        assert_eq!(world.agent(), Position::ORIGIN);
    }

    #[test]
    fn test_moves_follow_offsets() {
        let mut world = seed_1_world();

        assert_eq!(world.move_agent(Action::Right), MoveResult::Moved);
        assert_eq!(world.agent(), Position::new(1, 0));
        for _ in 0..3 {
            assert_eq!(world.move_agent(Action::Right), MoveResult::Moved);
        }
        assert_eq!(world.move_agent(Action::Up), MoveResult::Moved);
        assert_eq!(world.agent(), Position::new(4, 1));
        assert_eq!(world.move_agent(Action::Down), MoveResult::Moved);
        assert_eq!(world.move_agent(Action::Left), MoveResult::Moved);
        assert_eq!(world.agent(), Position::new(3, 0));
    }

    #[test]
    fn test_move_agrees_with_is_walkable() {
        let grid = MazeGenerator::generate(11, 2, Some(2024)).unwrap();
        for start in grid.positions().filter(|&p| grid.is_open(p)) {
            for action in Action::ALL {
                let mut world = GridEnvironment::new(grid.clone());
                world.agent = start;
                let (dx, dy) = action.offset();
                let walkable =
                    world.is_walkable(start.x as isize + dx as isize, start.y as isize + dy as isize);

                let result = world.move_agent(action);
                if walkable {
                    assert_eq!(result, MoveResult::Moved);
                    assert_ne!(world.agent(), start);
                } else {
                    assert_eq!(result, MoveResult::Blocked);
                    assert_eq!(world.agent(), start);
                }
            }
        }
    }

    #[test]
    fn test_coin_collection_is_idempotent() {
        let mut world = two_coin_world();
        assert!(!world.touching_coin());
        assert!(!world.collect_coin());

        world.move_agent(Action::Up);
        assert!(world.touching_coin());
        assert!(world.collect_coin());
        assert!(!world.touching_coin());
        assert!(!world.collect_coin());
        assert_eq!(world.grid().state(Position::new(0, 1)), Some(CellState::Passage));
        assert_eq!(world.coins_remaining(), 1);
    }

    #[test]
    fn test_all_coins_collected() {
        let mut world = two_coin_world();
        assert!(!world.all_coins_collected());

        world.move_agent(Action::Up);
        world.collect_coin();
        assert!(!world.all_coins_collected());

        world.move_agent(Action::Up);
        world.collect_coin();
        assert!(world.all_coins_collected());
        assert_eq!(world.coins_remaining(), 0);
    }

    #[test]
    fn test_mark_visited_if_new() {
        let mut world = seed_1_world();

        // Start cell is visited at construction
        assert!(!world.mark_visited_if_new(Position::ORIGIN));
        assert!(world.mark_visited_if_new(Position::new(1, 0)));
        assert!(!world.mark_visited_if_new(Position::new(1, 0)));
        assert!(!world.mark_visited_if_new(Position::new(0, 1))); // wall
        assert!(!world.mark_visited_if_new(Position::new(9, 9)));
    }

    #[test]
    fn test_new_clears_previous_visits() {
        let mut world = seed_1_world();
        world.mark_visited_if_new(Position::new(1, 0));

        let mut fresh = GridEnvironment::new(world.grid().clone());
        assert!(fresh.mark_visited_if_new(Position::new(1, 0)));
    }

    #[test]
    fn test_nearest_coin() {
        let mut world = two_coin_world();
        assert_eq!(world.nearest_coin(), Some((Position::new(0, 1), 1)));

        world.move_agent(Action::Up);
        world.collect_coin();
        assert_eq!(world.nearest_coin(), Some((Position::new(0, 2), 1)));

        world.move_agent(Action::Up);
        world.collect_coin();
        assert_eq!(world.nearest_coin(), None);
    }

    #[test]
    fn test_snapshot() {
        let world = seed_1_world();
        let snapshot = world.snapshot();

        assert_eq!(snapshot.size, 7);
        assert_eq!(snapshot.seed, 1);
        assert_eq!(snapshot.agent, Position::ORIGIN);
        assert_eq!(snapshot.coins_remaining, 1);
        assert_eq!(snapshot.nearest_coin, Some(Position::new(2, 2)));
        assert_eq!(snapshot.matrix[2], vec![0, 1, 2, 1, 0, 0, 0]);
        assert_eq!(snapshot.matrix[0], vec![0, 1, 0, 0, 0, 0, 0]);
    }
}
