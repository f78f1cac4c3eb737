//! Error types for maze generation and episode control

use thiserror::Error;

use crate::env::EpisodePhase;

/// Errors surfaced by the environment core.
///
/// Blocked moves are not errors; they are reported through the step
/// transition (see [`crate::env::Transition`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Configuration values that cannot produce a playable maze.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raw action index outside `0..=3`.
    #[error("invalid action index {0}: expected 0 (up), 1 (right), 2 (down) or 3 (left)")]
    InvalidAction(u8),

    /// Not enough dead-end cells to hold the requested coins.
    #[error("cannot place {requested} coins: only {available} dead-end cells available")]
    InsufficientCoinPlacement {
        /// Coins asked for.
        requested: usize,
        /// Dead-end candidates found in the carved grid.
        available: usize,
    },

    /// `step` called on a finished episode without an intervening `reset`.
    #[error("cannot step an episode in the {phase} phase; call reset first")]
    InvalidStateTransition {
        /// Phase the episode was in when `step` was called.
        phase: EpisodePhase,
    },
}

/// Convenience alias for core results.
pub type Result<T> = std::result::Result<T, MazeError>;
