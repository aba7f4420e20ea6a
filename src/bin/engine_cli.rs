//! CLI smoke-test harness for the engine: load a scenario JSON file, run it
//! to completion or validate its starting state. Grounded on the teacher's
//! `sim_cli.rs` subcommand structure, scaled down to this engine's surface.

use clap::{Parser, Subcommand};
use hexfray_engine::{Engine, EngineConfig, Monster, Player};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "engine_cli")]
#[command(about = "CLI tools for the hex-grid tactical combat engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario to completion and print the round-by-round log.
    Run {
        /// Path to the scenario JSON file
        scenario: PathBuf,
        /// Seed the deterministic RNG before running
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Load a scenario and report any starting-state invariant violations.
    Validate {
        /// Path to the scenario JSON file
        scenario: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
struct Scenario {
    players: Vec<Player>,
    monsters: Vec<Monster>,
    #[serde(default)]
    config: EngineConfig,
}

fn load_scenario(path: &PathBuf) -> Scenario {
    let raw = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("failed to parse {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenario, seed } => run_scenario(&scenario, seed),
        Commands::Validate { scenario } => validate_scenario(&scenario),
    }
}

fn run_scenario(path: &PathBuf, seed: Option<u64>) {
    if let Some(seed) = seed {
        hexfray_engine::rng::seed(seed);
    }
    let scenario = load_scenario(path);
    let mut engine = Engine::new(scenario.players, scenario.monsters, Some(scenario.config)).unwrap_or_else(|e| {
        eprintln!("invalid scenario: {}", e);
        std::process::exit(1);
    });
    engine.start_game().expect("fresh engine always starts");

    loop {
        let result = engine.process_round();
        println!(
            "round {}: {} action(s), {} status tick(s)",
            result.round_number,
            result.action_results.len(),
            result.status_effect_results.len()
        );
        for action in &result.action_results {
            log::info!("{}: {:?} success={} reason={:?}", action.entity_name, action.variant, action.success, action.reason);
        }
        if result.game_ended {
            match (result.winner, result.reason) {
                (Some(winner), Some(reason)) => println!("game ended: {:?} ({})", winner, reason),
                _ => println!("game ended"),
            }
            break;
        }
    }
}

fn validate_scenario(path: &PathBuf) {
    let scenario = load_scenario(path);
    let state = hexfray_engine::GameState::new(scenario.players, scenario.monsters, Default::default());
    let violations = hexfray_engine::validation::validate_game_state(&state);
    if violations.is_empty() {
        println!("scenario is valid");
    } else {
        println!("{} violation(s) found:", violations.len());
        for v in &violations {
            println!("  - {}", v);
        }
        std::process::exit(1);
    }
}
