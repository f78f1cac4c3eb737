//! Ray-cast observations
//!
//! From the agent's cell a ray is cast in each cardinal direction (in
//! [`Action::ALL`] order). A ray advances while the next cell is walkable
//! and at most `max_range` cells. The observation is the distance each ray
//! travelled plus whether it passed over a coin; nothing about the absolute
//! position is exposed, so the vector has the same shape for every maze.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::{MazeError, Result};
use crate::grid::{CellState, Grid, Position};

/// Length of [`Observation::to_vector`].
pub const OBSERVATION_LEN: usize = 8;

/// Result of one directional scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ray {
    /// Walkable cells stepped into before stopping.
    pub distance: u32,
    /// A coin lies on one of those cells.
    pub coin_visible: bool,
}

/// Four rays, indexed like [`Action::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Observation {
    pub rays: [Ray; 4],
}

impl Observation {
    pub fn ray(&self, direction: Action) -> Ray {
        self.rays[direction.index()]
    }

    /// Four distances followed by four coin flags (1.0 / 0.0).
    pub fn to_vector(&self) -> [f32; OBSERVATION_LEN] {
        let mut out = [0.0; OBSERVATION_LEN];
        for (i, ray) in self.rays.iter().enumerate() {
            out[i] = ray.distance as f32;
            out[i + 4] = if ray.coin_visible { 1.0 } else { 0.0 };
        }
        out
    }
}

/// Casts rays of bounded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerceptionEncoder {
    max_range: u32,
}

impl PerceptionEncoder {
    pub fn new(max_range: u32) -> Result<Self> {
        if max_range == 0 {
            return Err(MazeError::InvalidConfig(
                "ray range must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_range })
    }

    pub fn max_range(&self) -> u32 {
        self.max_range
    }

    pub fn encode(&self, grid: &Grid, agent: Position) -> Observation {
        let mut observation = Observation::default();
        for action in Action::ALL {
            observation.rays[action.index()] = self.cast(grid, agent, action);
        }
        observation
    }

    fn cast(&self, grid: &Grid, from: Position, direction: Action) -> Ray {
        let mut ray = Ray::default();
        let mut pos = from;

        while ray.distance < self.max_range {
            let Some(next) = grid.offset(pos, direction.offset()) else {
                break;
            };
            match grid.state(next) {
                Some(CellState::Passage) => {}
                Some(CellState::Coin) => ray.coin_visible = true,
                Some(CellState::Wall) | None => break,
            }
            ray.distance += 1;
            pos = next;
        }

        ray
    }
}
