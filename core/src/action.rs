//! Agent actions and their movement offsets
//!
//! Positions are `(x, y)`: `x` selects the row of the grid buffer and `y`
//! the column. Right/Left move along `x`, Up/Down move along `y`:
//!
//! | Action | index | (dx, dy) |
//! |--------|-------|----------|
//! | Up     | 0     | (0, +1)  |
//! | Right  | 1     | (+1, 0)  |
//! | Down   | 2     | (0, -1)  |
//! | Left   | 3     | (-1, 0)  |

use serde::{Deserialize, Serialize};

use crate::error::MazeError;

/// One of the four cardinal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    /// All actions in index order.
    pub const ALL: [Action; 4] = [Action::Up, Action::Right, Action::Down, Action::Left];

    /// Canonical index used by external learners.
    pub const fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Right => 1,
            Action::Down => 2,
            Action::Left => 3,
        }
    }

    /// Inverse of [`Action::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Movement offset `(dx, dy)`.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Action::Up => (0, 1),
            Action::Right => (1, 0),
            Action::Down => (0, -1),
            Action::Left => (-1, 0),
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = MazeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value as usize).ok_or(MazeError::InvalidAction(value))
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Action::Up),
            "right" => Ok(Action::Right),
            "down" => Ok(Action::Down),
            "left" => Ok(Action::Left),
            _ => Err(format!(
                "Invalid action: '{}'. Must be 'up', 'right', 'down' or 'left'",
                s
            )),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Up => write!(f, "up"),
            Action::Right => write!(f, "right"),
            Action::Down => write!(f, "down"),
            Action::Left => write!(f, "left"),
        }
    }
}

/// Outcome of a single movement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveResult {
    Moved,
    Blocked,
}
