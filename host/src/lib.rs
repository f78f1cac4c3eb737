use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use maze_core::{
    Action, EnvConfig, EnvironmentController, GridSnapshot, Observation, OBSERVATION_LEN,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Step budget applied when the caller does not set one
pub const DEFAULT_MAX_STEPS: u32 = 2000;

/// Upper bound on moves accepted from a file
pub const MAX_MOVES: usize = 10_000;

const MAX_FILE_BYTES: usize = 10_000_000;

/// Why an episode driver stopped
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    /// Every coin was collected
    Terminated,
    /// A move ran into a wall or the grid edge
    Truncated,
    /// The step budget ran out first
    BudgetExhausted,
    /// The policy had no further action
    MovesExhausted,
}

impl std::fmt::Display for EpisodeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpisodeOutcome::Terminated => write!(f, "terminated"),
            EpisodeOutcome::Truncated => write!(f, "truncated"),
            EpisodeOutcome::BudgetExhausted => write!(f, "budget exhausted"),
            EpisodeOutcome::MovesExhausted => write!(f, "moves exhausted"),
        }
    }
}

/// One applied action and what it produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub step: u32,
    pub action: Action,
    pub reward: f32,
    pub observation: [f32; OBSERVATION_LEN],
    pub terminated: bool,
    pub truncated: bool,
}

/// Summary of a driven episode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeReport {
    pub seed: u32,
    pub size: usize,
    pub outcome: EpisodeOutcome,
    pub steps: u32,
    pub episode_return: f32,
    pub coins_collected: usize,
    pub cells_visited: usize,
    pub trajectory: Vec<StepRecord>,
}

/// Drive the controller's current episode until it finishes, the policy
/// returns `None`, or `max_steps` actions have been applied.
///
/// The controller is not reset here; pass one that is ready to step.
pub fn run_episode<P>(
    controller: &mut EnvironmentController,
    mut policy: P,
    max_steps: u32,
) -> Result<EpisodeReport>
where
    P: FnMut(&Observation) -> Option<Action>,
{
    let mut trajectory = Vec::new();

    let outcome = loop {
        if controller.state().steps >= max_steps {
            break EpisodeOutcome::BudgetExhausted;
        }
        let Some(action) = policy(&controller.observation()) else {
            break EpisodeOutcome::MovesExhausted;
        };

        let transition = controller
            .step(action)
            .with_context(|| format!("step {} failed", controller.state().steps + 1))?;

        trajectory.push(StepRecord {
            step: controller.state().steps,
            action,
            reward: transition.reward,
            observation: transition.observation.to_vector(),
            terminated: transition.terminated,
            truncated: transition.truncated,
        });

        if transition.terminated {
            break EpisodeOutcome::Terminated;
        }
        if transition.truncated {
            break EpisodeOutcome::Truncated;
        }
    };

    let state = controller.state();
    tracing::info!(
        seed = controller.seed(),
        %outcome,
        steps = state.steps,
        episode_return = state.episode_return,
        "episode driver stopped"
    );

    Ok(EpisodeReport {
        seed: controller.seed(),
        size: controller.config().size,
        outcome,
        steps: state.steps,
        episode_return: state.episode_return,
        coins_collected: state.coins_collected,
        cells_visited: state.cells_visited,
        trajectory,
    })
}

fn controller_for(config: &EnvConfig, seed: Option<u32>) -> Result<EnvironmentController> {
    let config = EnvConfig {
        seed: seed.or(config.seed),
        ..config.clone()
    };
    EnvironmentController::new(config).context("Failed to create environment")
}

/// Generate a maze and return its snapshot with the agent at the start.
pub fn generate_maze(config: &EnvConfig, seed: Option<u32>) -> Result<GridSnapshot> {
    let controller = controller_for(config, seed)?;
    Ok(controller.render())
}

/// Replay index-encoded moves (0 = up, 1 = right, 2 = down, 3 = left).
///
/// Every index is checked before the first step, so a bad list never
/// produces a partial episode.
pub fn replay_moves(
    config: &EnvConfig,
    seed: Option<u32>,
    moves: &[u8],
    max_steps: u32,
) -> Result<EpisodeReport> {
    let actions = moves
        .iter()
        .enumerate()
        .map(|(i, &m)| {
            Action::try_from(m).with_context(|| format!("Invalid move at position {}", i))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut controller = controller_for(config, seed)?;
    let mut remaining = actions.into_iter();
    run_episode(&mut controller, |_| remaining.next(), max_steps)
}

/// Uniform random policy, seeded separately from the maze.
pub fn random_rollout(
    config: &EnvConfig,
    seed: Option<u32>,
    policy_seed: u64,
    max_steps: u32,
) -> Result<EpisodeReport> {
    let mut controller = controller_for(config, seed)?;
    let mut rng = StdRng::seed_from_u64(policy_seed);
    run_episode(
        &mut controller,
        |_| Some(Action::ALL[rng.gen_range(0..Action::ALL.len())]),
        max_steps,
    )
}

fn read_limited(path: &Path) -> Result<String> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if json.len() > MAX_FILE_BYTES {
        bail!("{} is too large (max 10MB)", path.display());
    }
    Ok(json)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = read_limited(path)?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load an [`EnvConfig`]; missing fields take their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<EnvConfig> {
    let config: EnvConfig = load_json(path.as_ref())?;
    config
        .validate()
        .with_context(|| format!("Invalid config in {}", path.as_ref().display()))?;
    Ok(config)
}

/// Load a JSON array of move indices.
pub fn load_moves(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let moves: Vec<u8> = load_json(path.as_ref())?;

    if moves.is_empty() {
        bail!("Moves array is empty");
    }
    if moves.len() > MAX_MOVES {
        bail!("Too many moves: {} (max {})", moves.len(), MAX_MOVES);
    }

    Ok(moves)
}

pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
