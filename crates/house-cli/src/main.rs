//! House Simulation
//!
//! Runs a season of the social strategy game with autonomous agents.
//! Social actions come from the planner; nominations, vetoes and votes go
//! through the decision orchestrator, which falls back to local heuristics
//! when no LLM is configured.

use std::path::PathBuf;

use clap::Parser;
use house_core::{FactorEngine, HouseState, Ledger, Roster, SocialPlanner};
use house_oracle::Orchestrator;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

mod config;
mod season;
mod setup;

use config::SimConfig;
use season::Season;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "house_sim")]
#[command(about = "Runs a season of autonomous houseguests")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Maximum number of weeks to play
    #[arg(long, default_value_t = 10)]
    weeks: u32,

    /// Path to a TOML file with [engine] and [oracle] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Never call the LLM; every major decision uses the heuristics
    #[arg(long)]
    fail_open: bool,

    /// Where to write the interaction ledger when the season ends
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Pause between social actions, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match SimConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };
    if args.fail_open {
        config.oracle.fail_open = true;
    }
    if let Some(delay) = args.delay_ms {
        config.engine.planner.action_delay_ms = delay;
    }

    println!("House Simulation");
    println!("================");
    println!("Seed: {}", args.seed);
    println!("Weeks: {}", args.weeks);
    println!();

    let mut state = HouseState::new(setup::sample_cast());
    state.ledger = Ledger::new(config.engine.ledger.clone());
    setup::seed_relationships(&mut state, &mut SmallRng::seed_from_u64(args.seed));

    let oracle = Orchestrator::from_env(
        config.oracle.clone(),
        FactorEngine::new(config.engine.weights.clone()),
        args.seed,
    );
    let planner = SocialPlanner::new(config.engine.planner.clone());
    let mut season = Season::new(state, planner, oracle, args.seed);

    for _ in 0..args.weeks {
        if season.is_over() {
            break;
        }
        println!("Week {} ({} remaining)", season.state().roster.week(), season.remaining());
        let report = season.play_week().await;
        tracing::info!(
            "Week {} done: {} social actions, evicted {:?}",
            report.week,
            report.social_actions,
            report.evicted
        );
        println!();
    }

    if season.is_over() {
        println!("Finale");
        match season.finale().await {
            Some(winner) => println!("  {} wins the season!", winner),
            None => println!("  No winner could be decided"),
        }
    } else {
        println!("Stopped after {} weeks with {} remaining", args.weeks, season.remaining());
    }

    if let Some(path) = &args.checkpoint {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Warning: Could not create {}: {}", parent.display(), e);
            }
        }
        match season.state().ledger.save_checkpoint(path) {
            Ok(()) => println!("Ledger written to {}", path.display()),
            Err(e) => eprintln!("Failed to write ledger: {}", e),
        }
    }
}
