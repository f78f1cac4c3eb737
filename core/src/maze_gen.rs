//! Maze generation using a randomized depth-first backtracker
//!
//! Rooms sit on even `(x, y)` coordinates; the odd cells between them are
//! walls that get knocked out as the backtracker advances.
//!
//! Algorithm:
//! 1. Fill the grid with walls, open `(0, 0)` and push it on the stack
//! 2. While the stack is not empty:
//!    - Collect wall rooms two cells away from the top of the stack
//!    - If any exist: pick one, open it and the wall between, push it
//!    - Else: backtrack (pop)
//! 3. If the exit corner is still a wall (even sizes), walk a corridor from
//!    it towards the origin until it meets an open cell
//! 4. Turn a random sample of dead ends into coins
//!
//! All randomness comes from one [`LehmerRng`] owned by the call, so a seed
//! fully determines the grid.

use tracing::{debug, trace};

use crate::error::{MazeError, Result};
use crate::grid::{CellState, Grid, Position};
use crate::rng::LehmerRng;

/// Offsets to rooms two cells away, in the order they are considered.
const ROOM_STEPS: [(i32, i32); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];

/// Smallest grid that has a distinct start and exit.
pub const MIN_MAZE_SIZE: usize = 2;

/// Largest accepted side length.
pub const MAX_MAZE_SIZE: usize = 1001;

/// Reject side lengths outside `MIN_MAZE_SIZE..=MAX_MAZE_SIZE`.
pub fn check_size(size: usize) -> Result<()> {
    if !(MIN_MAZE_SIZE..=MAX_MAZE_SIZE).contains(&size) {
        return Err(MazeError::InvalidConfig(format!(
            "maze size must be between {} and {}, got {}",
            MIN_MAZE_SIZE, MAX_MAZE_SIZE, size
        )));
    }
    Ok(())
}

/// Builds connected grids with coins placed on dead ends.
pub struct MazeGenerator;

impl MazeGenerator {
    /// Generate a grid.
    ///
    /// # Arguments
    /// * `size` - Side length of the square grid (odd sizes give the cleanest mazes)
    /// * `coin_count` - Number of coins to place on dead ends
    /// * `seed` - RNG seed; `None` draws one from entropy (recorded on the grid)
    ///
    /// # Returns
    /// A fully connected grid with open start and exit corners, or
    /// [`MazeError::InsufficientCoinPlacement`] if there are fewer dead ends
    /// than requested coins.
    pub fn generate(size: usize, coin_count: usize, seed: Option<u32>) -> Result<Grid> {
        check_size(size)?;

        let seed = seed.unwrap_or_else(LehmerRng::entropy_seed);
        let mut rng = LehmerRng::new(seed);
        let mut grid = Grid::walls(size, seed);

        Self::carve(&mut grid, &mut rng);
        Self::connect_exit(&mut grid, &mut rng);
        let candidates = Self::place_coins(&mut grid, coin_count, &mut rng)?;

        debug!(
            size,
            seed,
            coins = coin_count,
            dead_ends = candidates,
            "maze generated"
        );
        Ok(grid)
    }

    /// Iterative backtracker with an explicit stack.
    fn carve(grid: &mut Grid, rng: &mut LehmerRng) {
        let mut stack = Vec::with_capacity(grid.size() * grid.size() / 4 + 1);
        grid.set_state(Position::ORIGIN, CellState::Passage);
        stack.push(Position::ORIGIN);

        while let Some(&current) = stack.last() {
            let (rooms, count) = Self::closed_rooms(grid, current);

            if count == 0 {
                stack.pop();
                continue;
            }

            let next = rooms[rng.choice_index(count)];
            let between = Position::new((current.x + next.x) / 2, (current.y + next.y) / 2);
            grid.set_state(between, CellState::Passage);
            grid.set_state(next, CellState::Passage);
            stack.push(next);
        }
    }

    /// Rooms two steps away that are still walls.
    ///
    /// Returns a fixed array with a count instead of allocating.
    fn closed_rooms(grid: &Grid, pos: Position) -> ([Position; 4], usize) {
        let mut rooms = [Position::ORIGIN; 4];
        let mut count = 0;

        for step in ROOM_STEPS {
            if let Some(room) = grid.offset(pos, step) {
                if grid.state(room) == Some(CellState::Wall) {
                    rooms[count] = room;
                    count += 1;
                }
            }
        }

        (rooms, count)
    }

    /// Open a corridor from the exit towards the origin until it touches an
    /// open cell. Each step moves one cell up in `x` or `y`, so the corridor
    /// is 4-connected.
    fn connect_exit(grid: &mut Grid, rng: &mut LehmerRng) {
        let mut pos = grid.exit();
        if grid.is_open(pos) {
            return;
        }

        let mut opened = 0usize;
        loop {
            grid.set_state(pos, CellState::Passage);
            opened += 1;

            let up = pos.x.checked_sub(1).map(|x| Position::new(x, pos.y));
            let left = pos.y.checked_sub(1).map(|y| Position::new(pos.x, y));
            if up.is_some_and(|p| grid.is_open(p)) || left.is_some_and(|p| grid.is_open(p)) {
                break;
            }

            pos = match (up, left) {
                (Some(up), Some(left)) => {
                    if rng.choice_index(2) == 0 {
                        up
                    } else {
                        left
                    }
                }
                (Some(up), None) => up,
                (None, Some(left)) => left,
                // Only (0, 0) has neither, and it is always open
                (None, None) => break,
            };
        }

        trace!(cells = opened, "exit corridor opened");
    }

    /// Whether `pos` is a dead end: a passage with exactly three wall
    /// neighbours inside the grid.
    pub fn is_dead_end(grid: &Grid, pos: Position) -> bool {
        grid.state(pos) == Some(CellState::Passage) && grid.wall_neighbors(pos) == 3
    }

    /// Coin candidates in row-major order.
    pub fn dead_ends(grid: &Grid) -> Vec<Position> {
        grid.positions()
            .filter(|&p| Self::is_dead_end(grid, p))
            .collect()
    }

    /// Sample `coin_count` dead ends and mark them as coins.
    ///
    /// Returns the number of candidates that were available.
    fn place_coins(grid: &mut Grid, coin_count: usize, rng: &mut LehmerRng) -> Result<usize> {
        let candidates = Self::dead_ends(grid);

        let picked = rng
            .sample_indices(candidates.len(), coin_count)
            .ok_or(MazeError::InsufficientCoinPlacement {
                requested: coin_count,
                available: candidates.len(),
            })?;

        for idx in picked {
            grid.set_state(candidates[idx], CellState::Coin);
        }

        Ok(candidates.len())
    }
}
