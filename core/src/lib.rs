//! Coin-collecting maze environment
//!
//! This crate generates seeded mazes and simulates an agent walking them to
//! collect coins. Learners drive it through
//! [`EnvironmentController::reset`] and [`EnvironmentController::step`],
//! which return ray-cast observations, rewards and termination flags.
//!
//! The crate performs no I/O; episode drivers and the HTTP surface live in
//! the host and api-server crates.

pub mod action;
pub mod config;
pub mod env;
pub mod error;
pub mod grid;
pub mod maze_gen;
pub mod perception;
pub mod rng;
pub mod world;

// Re-export commonly used types for convenience
pub use action::{Action, MoveResult};
pub use config::{EnvConfig, RewardConfig};
pub use env::{EnvironmentController, EpisodePhase, EpisodeState, Transition};
pub use error::MazeError;
pub use grid::{Cell, CellState, Grid, Position};
pub use maze_gen::{MazeGenerator, MAX_MAZE_SIZE, MIN_MAZE_SIZE};
pub use perception::{Observation, PerceptionEncoder, Ray, OBSERVATION_LEN};
pub use rng::LehmerRng;
pub use world::{GridEnvironment, GridSnapshot};

/// Default side length of generated mazes
pub const DEFAULT_MAZE_SIZE: usize = 15;

/// Default number of coins per episode
pub const DEFAULT_COIN_COUNT: usize = 1;

/// Default maximum ray length in cells
pub const DEFAULT_RAY_RANGE: u32 = 4;

/// Paid on every successful move
pub const STEP_PENALTY: f32 = -0.5;

/// Paid the first time a cell is entered
pub const NEW_CELL_REWARD: f32 = 10.0;

/// Paid for each collected coin
pub const COIN_REWARD: f32 = 500.0;

/// Paid on the step that collects the last coin
pub const ALL_COINS_REWARD: f32 = 1000.0;

/// Whole reward of a move into a wall or off the grid
pub const BLOCKED_PENALTY: f32 = -20.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(OBSERVATION_LEN, 8);
        assert!(DEFAULT_MAZE_SIZE % 2 == 1);
        assert!(DEFAULT_RAY_RANGE > 0);
    }

    #[test]
    fn test_default_config_builds() {
        let config = EnvConfig {
            seed: Some(2918957128),
            ..EnvConfig::default()
        };
        let env = EnvironmentController::new(config).unwrap();
        assert_eq!(env.render().size, DEFAULT_MAZE_SIZE);
        assert_eq!(env.render().coins_remaining, DEFAULT_COIN_COUNT);
    }
}
