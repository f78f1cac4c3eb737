//! Environment and reward configuration
//!
//! Both structs deserialize with defaults for missing fields, so a config
//! file only needs the values it overrides.

use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::maze_gen::{check_size, MAX_MAZE_SIZE};
use crate::{
    ALL_COINS_REWARD, BLOCKED_PENALTY, COIN_REWARD, DEFAULT_COIN_COUNT, DEFAULT_MAZE_SIZE,
    DEFAULT_RAY_RANGE, NEW_CELL_REWARD, STEP_PENALTY,
};

/// Reward paid for each step outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Added on every successful move.
    pub step_penalty: f32,
    /// Added when the agent enters a cell for the first time.
    pub new_cell: f32,
    /// Added when a coin is collected.
    pub coin: f32,
    /// Added on the step that collects the last coin.
    pub all_coins: f32,
    /// The whole reward of a blocked move.
    pub blocked: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_penalty: STEP_PENALTY,
            new_cell: NEW_CELL_REWARD,
            coin: COIN_REWARD,
            all_coins: ALL_COINS_REWARD,
            blocked: BLOCKED_PENALTY,
        }
    }
}

/// Parameters for [`crate::EnvironmentController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Side length of generated grids.
    pub size: usize,
    /// Coins placed per episode.
    pub coin_count: usize,
    /// Maximum ray length in cells.
    pub ray_range: u32,
    /// Seed for the first episode; `None` draws from entropy.
    pub seed: Option<u32>,
    pub rewards: RewardConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_MAZE_SIZE,
            coin_count: DEFAULT_COIN_COUNT,
            ray_range: DEFAULT_RAY_RANGE,
            seed: None,
            rewards: RewardConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Reject values that can never produce an episode.
    ///
    /// Whether enough dead ends exist for `coin_count` depends on the seed,
    /// so that is checked at generation time instead.
    pub fn validate(&self) -> Result<()> {
        check_size(self.size)?;
        if self.ray_range == 0 {
            return Err(MazeError::InvalidConfig(
                "ray range must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
