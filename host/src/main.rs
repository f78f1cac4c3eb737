use anyhow::{bail, Context, Result};
use host::{
    generate_maze, load_config, load_moves, random_rollout, replay_moves, save_json,
    EpisodeReport, DEFAULT_MAX_STEPS,
};
use maze_core::EnvConfig;
use std::env;
use std::time::Instant;

/// Flags shared by every command
struct Options {
    config: EnvConfig,
    seed: Option<u32>,
    max_steps: u32,
    policy_seed: u64,
    output: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(program_name(&args));
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// argv[0], or the binary name when the platform passes an empty argv.
fn program_name(args: &[String]) -> &str {
    args.first().map_or("coin-maze", String::as_str)
}

fn run(args: &[String]) -> Result<()> {
    let program = program_name(args);
    let Some(command) = args.get(1).map(String::as_str) else {
        print_usage(program);
        bail!("Missing command");
    };

    match command {
        "generate-maze" => {
            let options = parse_options(&args[2..])?;
            generate_maze_command(&options)
        }
        "replay" => {
            let Some(moves_file) = args.get(2) else {
                bail!("Usage: {} replay <moves_file> [options]", program);
            };
            let options = parse_options(&args[3..])?;
            replay_command(moves_file, &options)
        }
        "rollout" => {
            let options = parse_options(&args[2..])?;
            rollout_command(&options)
        }
        "help" | "--help" | "-h" => {
            print_usage(program);
            Ok(())
        }
        other => {
            print_usage(program);
            bail!("Unknown command '{}'", other)
        }
    }
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut config_file: Option<&str> = None;
    let mut size: Option<usize> = None;
    let mut coins: Option<usize> = None;
    let mut options = Options {
        config: EnvConfig::default(),
        seed: None,
        max_steps: DEFAULT_MAX_STEPS,
        policy_seed: 0,
        output: None,
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .map(String::as_str)
            .with_context(|| format!("Missing value for {}", flag))?;

        match flag {
            "--config" => config_file = Some(value),
            "--size" => size = Some(parse_value(flag, value)?),
            "--coins" => coins = Some(parse_value(flag, value)?),
            "--seed" => options.seed = Some(parse_value(flag, value)?),
            "--max-steps" => options.max_steps = parse_value(flag, value)?,
            "--policy-seed" => options.policy_seed = parse_value(flag, value)?,
            "--output" => options.output = Some(value.to_string()),
            _ => bail!("Unknown option '{}'", flag),
        }
        i += 2;
    }

    if let Some(path) = config_file {
        options.config = load_config(path)?;
    }
    if let Some(size) = size {
        options.config.size = size;
    }
    if let Some(coins) = coins {
        options.config.coin_count = coins;
    }
    options.config.validate()?;

    Ok(options)
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value '{}' for {}", value, flag))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  generate-maze [options]");
    eprintln!("      Generate a maze and print or save its snapshot (JSON)");
    eprintln!();
    eprintln!("  replay <moves_file> [options]");
    eprintln!("      Replay a JSON array of move indices against a maze");
    eprintln!("      Moves: 0=up, 1=right, 2=down, 3=left");
    eprintln!();
    eprintln!("  rollout [options]");
    eprintln!("      Run one episode with a seeded uniform random policy");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file>       JSON environment config (missing fields use defaults)");
    eprintln!("  --size <n>            Maze side length");
    eprintln!("  --coins <n>           Number of coins");
    eprintln!("  --seed <n>            Maze seed (default: random)");
    eprintln!("  --max-steps <n>       Step budget (default: {})", DEFAULT_MAX_STEPS);
    eprintln!("  --policy-seed <n>     Seed for the rollout policy (default: 0)");
    eprintln!("  --output <file>       Save the result as JSON");
    eprintln!();
    eprintln!("Example workflow:");
    eprintln!("  1. Generate maze:  {} generate-maze --size 7 --seed 1", program);
    eprintln!("  2. Replay moves:   {} replay moves.json --size 7 --seed 1", program);
    eprintln!("  3. Random policy:  {} rollout --size 15 --coins 3 --policy-seed 7", program);
}

fn generate_maze_command(options: &Options) -> Result<()> {
    let snapshot = generate_maze(&options.config, options.seed)?;

    println!("📋 Generated maze");
    println!("  Seed: {}", snapshot.seed);
    println!("  Grid size: {}x{} cells", snapshot.size, snapshot.size);
    println!("  Coins: {}", snapshot.coins_remaining);

    match &options.output {
        Some(path) => {
            save_json(&snapshot, path)?;
            println!("💾 Maze saved to: {}", path);
        }
        None => println!("{}", serde_json::to_string(&snapshot)?),
    }
    Ok(())
}

fn replay_command(moves_file: &str, options: &Options) -> Result<()> {
    let moves = load_moves(moves_file)?;
    println!("📋 Replaying {} moves from {}", moves.len(), moves_file);

    let start = Instant::now();
    let report = replay_moves(&options.config, options.seed, &moves, options.max_steps)?;
    print_report(&report, start);
    save_report(&report, options)
}

fn rollout_command(options: &Options) -> Result<()> {
    println!("📋 Random rollout (policy seed {})", options.policy_seed);

    let start = Instant::now();
    let report = random_rollout(
        &options.config,
        options.seed,
        options.policy_seed,
        options.max_steps,
    )?;
    print_report(&report, start);
    save_report(&report, options)
}

fn print_report(report: &EpisodeReport, start: Instant) {
    println!("  Maze seed: {}", report.seed);
    println!("  Outcome: {}", report.outcome);
    println!("  Steps: {}", report.steps);
    println!("  Return: {:.1}", report.episode_return);
    println!("  Coins collected: {}", report.coins_collected);
    println!("  Cells visited: {}", report.cells_visited);
    println!("  Time: {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);
}

fn save_report(report: &EpisodeReport, options: &Options) -> Result<()> {
    if let Some(path) = &options.output {
        save_json(report, path)?;
        println!("💾 Report saved to: {}", path);
    }
    Ok(())
}
