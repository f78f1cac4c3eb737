//! Episode controller: reset, step and render
//!
//! Phases:
//! - `Ready`: after reset, no steps taken
//! - `Running`: at least one step, episode not finished
//! - `Terminated`: every coin collected
//! - `Truncated`: a move was blocked
//!
//! Stepping a finished episode is an error until the next reset. Step
//! budgets are enforced by the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action::{Action, MoveResult};
use crate::config::EnvConfig;
use crate::error::{MazeError, Result};
use crate::grid::Grid;
use crate::maze_gen::MazeGenerator;
use crate::perception::{Observation, PerceptionEncoder};
use crate::world::{GridEnvironment, GridSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodePhase {
    Ready,
    Running,
    Terminated,
    Truncated,
}

impl EpisodePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, EpisodePhase::Terminated | EpisodePhase::Truncated)
    }
}

impl std::fmt::Display for EpisodePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpisodePhase::Ready => write!(f, "ready"),
            EpisodePhase::Running => write!(f, "running"),
            EpisodePhase::Terminated => write!(f, "terminated"),
            EpisodePhase::Truncated => write!(f, "truncated"),
        }
    }
}

/// Per-episode counters. Reinitialized by every reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeState {
    pub phase: EpisodePhase,
    pub steps: u32,
    /// Reward of the most recent step.
    pub reward: f32,
    /// Sum of step rewards since reset.
    pub episode_return: f32,
    pub coins_collected: usize,
    /// Distinct cells entered, including the start cell.
    pub cells_visited: usize,
}

impl EpisodeState {
    fn new() -> Self {
        Self {
            phase: EpisodePhase::Ready,
            steps: 0,
            reward: 0.0,
            episode_return: 0.0,
            coins_collected: 0,
            cells_visited: 1,
        }
    }
}

/// What one call to [`EnvironmentController::step`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
}

/// Runs episodes over freshly generated mazes.
#[derive(Debug, Clone)]
pub struct EnvironmentController {
    config: EnvConfig,
    encoder: PerceptionEncoder,
    world: GridEnvironment,
    observation: Observation,
    state: EpisodeState,
}

impl EnvironmentController {
    /// Validate `config` and start the first episode from `config.seed`.
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.validate()?;
        let encoder = PerceptionEncoder::new(config.ray_range)?;
        let grid = MazeGenerator::generate(config.size, config.coin_count, config.seed)?;

        let world = GridEnvironment::new(grid);
        let observation = encoder.encode(world.grid(), world.agent());
        info!(
            seed = world.grid().seed(),
            size = config.size,
            coins = config.coin_count,
            "environment created"
        );

        Ok(Self {
            config,
            encoder,
            world,
            observation,
            state: EpisodeState::new(),
        })
    }

    /// Start a new episode on a freshly generated maze.
    ///
    /// If generation fails the current episode is left untouched.
    pub fn reset(&mut self, seed: Option<u32>) -> Result<Observation> {
        let grid = MazeGenerator::generate(self.config.size, self.config.coin_count, seed)?;
        Ok(self.install(grid))
    }

    fn install(&mut self, grid: Grid) -> Observation {
        info!(seed = grid.seed(), size = grid.size(), "episode reset");
        self.world = GridEnvironment::new(grid);
        self.observation = self.encoder.encode(self.world.grid(), self.world.agent());
        self.state = EpisodeState::new();
        self.observation
    }

    /// Apply one action.
    ///
    /// A blocked move truncates the episode and pays only the blocked
    /// penalty. A successful move pays the step penalty plus any new-cell,
    /// coin and all-coins bonuses, and terminates when no coin remains.
    pub fn step(&mut self, action: Action) -> Result<Transition> {
        if self.state.phase.is_finished() {
            return Err(MazeError::InvalidStateTransition {
                phase: self.state.phase,
            });
        }

        let rewards = self.config.rewards;
        self.state.steps += 1;

        let transition = match self.world.move_agent(action) {
            MoveResult::Blocked => {
                self.state.phase = EpisodePhase::Truncated;
                Transition {
                    observation: self.observation,
                    reward: rewards.blocked,
                    terminated: false,
                    truncated: true,
                }
            }
            MoveResult::Moved => {
                let pos = self.world.agent();
                let mut reward = rewards.step_penalty;

                if self.world.mark_visited_if_new(pos) {
                    reward += rewards.new_cell;
                    self.state.cells_visited += 1;
                }
                if self.world.collect_coin() {
                    reward += rewards.coin;
                    self.state.coins_collected += 1;
                }

                let terminated = self.world.all_coins_collected();
                if terminated {
                    reward += rewards.all_coins;
                    self.state.phase = EpisodePhase::Terminated;
                } else {
                    self.state.phase = EpisodePhase::Running;
                }

                self.observation = self.encoder.encode(self.world.grid(), pos);
                Transition {
                    observation: self.observation,
                    reward,
                    terminated,
                    truncated: false,
                }
            }
        };

        self.state.reward = transition.reward;
        self.state.episode_return += transition.reward;

        debug!(
            step = self.state.steps,
            %action,
            reward = transition.reward,
            phase = %self.state.phase,
            "step"
        );
        if self.state.phase.is_finished() {
            info!(
                phase = %self.state.phase,
                steps = self.state.steps,
                episode_return = self.state.episode_return,
                coins = self.state.coins_collected,
                "episode finished"
            );
        }

        Ok(transition)
    }

    /// [`Self::step`] with a raw action index (0 = up, 1 = right, 2 = down,
    /// 3 = left).
    pub fn step_index(&mut self, index: u8) -> Result<Transition> {
        self.step(Action::try_from(index)?)
    }

    pub fn render(&self) -> GridSnapshot {
        self.world.snapshot()
    }

    /// Observation of the current position.
    pub fn observation(&self) -> Observation {
        self.observation
    }

    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    pub fn world(&self) -> &GridEnvironment {
        &self.world
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Seed of the current maze.
    pub fn seed(&self) -> u32 {
        self.world.grid().seed()
    }
}
