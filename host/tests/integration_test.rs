use host::{
    generate_maze, random_rollout, replay_moves, EpisodeOutcome, DEFAULT_MAX_STEPS,
};
use maze_core::{Action, EnvConfig, GridSnapshot, Position};

/// The known maze seed for testing
const MAZE_SEED: u32 = 1;

/// Shortest route to the single coin of the 7x7 test maze
/// Directions: 0=UP, 1=RIGHT, 2=DOWN, 3=LEFT
const TEST_MOVES: &[u8] = &[1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 3, 3, 2, 2, 3, 3, 2, 2, 1, 1];

fn small_config() -> EnvConfig {
    EnvConfig {
        size: 7,
        coin_count: 1,
        ..EnvConfig::default()
    }
}

#[test]
fn test_valid_solution() {
    let report = replay_moves(&small_config(), Some(MAZE_SEED), TEST_MOVES, DEFAULT_MAX_STEPS)
        .expect("Replay failed");

    assert_eq!(report.outcome, EpisodeOutcome::Terminated);
    assert_eq!(report.seed, MAZE_SEED);
    assert_eq!(report.steps, 20);
    assert_eq!(report.coins_collected, 1);
    assert_eq!(report.cells_visited, 21);
    // 19 fresh cells at 9.5, then the coin cell: 9.5 + 500 + 1000
    assert_eq!(report.episode_return, 1690.0);

    let last = report.trajectory.last().expect("empty trajectory");
    assert!(last.terminated);
    assert_eq!(last.reward, 1509.5);
}

#[test]
fn test_first_step_observation() {
    let report = replay_moves(&small_config(), Some(MAZE_SEED), &[1], DEFAULT_MAX_STEPS)
        .expect("Replay failed");

    assert_eq!(report.outcome, EpisodeOutcome::MovesExhausted);
    let record = &report.trajectory[0];
    assert_eq!(record.action, Action::Right);
    assert_eq!(record.reward, 9.5);
    assert_eq!(record.observation, [0.0, 3.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_blocked_move_truncates() {
    // Up from the start runs into the wall at (0,1)
    let report = replay_moves(&small_config(), Some(MAZE_SEED), &[0, 1, 1], DEFAULT_MAX_STEPS)
        .expect("Replay failed");

    assert_eq!(report.outcome, EpisodeOutcome::Truncated);
    assert_eq!(report.steps, 1);
    assert_eq!(report.episode_return, -20.0);
    assert!(report.trajectory[0].truncated);
}

#[test]
fn test_invalid_move_index() {
    let result = replay_moves(&small_config(), Some(MAZE_SEED), &[1, 4], DEFAULT_MAX_STEPS);
    assert!(result.is_err(), "Move index 4 should be rejected");
}

#[test]
fn test_wrong_seed() {
    // The seed 2 maze has a wall where the route turns up
    let report = replay_moves(&small_config(), Some(2), TEST_MOVES, DEFAULT_MAX_STEPS)
        .expect("Replay failed");
    assert_eq!(report.outcome, EpisodeOutcome::Truncated);
    assert_eq!(report.steps, 5);
}

#[test]
fn test_step_budget() {
    let report = replay_moves(&small_config(), Some(MAZE_SEED), TEST_MOVES, 4)
        .expect("Replay failed");

    assert_eq!(report.outcome, EpisodeOutcome::BudgetExhausted);
    assert_eq!(report.steps, 4);
    assert_eq!(report.coins_collected, 0);
}

#[test]
fn test_random_rollout_is_reproducible() {
    let config = EnvConfig {
        size: 15,
        coin_count: 3,
        ..EnvConfig::default()
    };

    let a = random_rollout(&config, Some(99999), 7, DEFAULT_MAX_STEPS).expect("Rollout failed");
    let b = random_rollout(&config, Some(99999), 7, DEFAULT_MAX_STEPS).expect("Rollout failed");
    assert_eq!(a, b);

    assert!(matches!(
        a.outcome,
        EpisodeOutcome::Truncated | EpisodeOutcome::Terminated
    ));
    assert_eq!(a.steps as usize, a.trajectory.len());
}

#[test]
fn test_maze_snapshot_json() {
    let snapshot = generate_maze(&small_config(), Some(MAZE_SEED)).expect("Generation failed");

    assert_eq!(snapshot.agent, Position::ORIGIN);
    assert_eq!(snapshot.coins_remaining, 1);
    assert_eq!(snapshot.matrix[2], vec![0, 1, 2, 1, 0, 0, 0]);

    let json = serde_json::to_string(&snapshot).expect("Serialization failed");
    let parsed: GridSnapshot = serde_json::from_str(&json).expect("Deserialization failed");
    assert_eq!(parsed, snapshot);
}

#[test]
fn test_insufficient_coins_is_an_error() {
    let config = EnvConfig {
        size: 7,
        coin_count: 100,
        ..EnvConfig::default()
    };
    assert!(generate_maze(&config, Some(MAZE_SEED)).is_err());

    // No interior dead end exists in the 5x5 maze for seed 42
    let config = EnvConfig {
        size: 5,
        coin_count: 1,
        ..EnvConfig::default()
    };
    assert!(generate_maze(&config, Some(42)).is_err());
}
