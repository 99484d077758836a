//! Self-play CLI: run batches of random games and print aggregate results.
//!
//! Usage:
//!   cargo run --release -- --games 200 --players 3
//!   cargo run --release -- --config settings.toml --json

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use meeple_rules_engine::config::{load_default_settings, load_settings};
use meeple_rules_engine::engine::simulator::run_batch;

#[derive(Parser)]
#[command(name = "meeple-rules", about = "Run headless self-play games of the tile-placement engine")]
struct Cli {
    /// Path to settings.toml (default: auto-discover)
    #[arg(long, env = "MEEPLE_SETTINGS")]
    config: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, default_value = "100", env = "MEEPLE_GAMES")]
    games: usize,

    /// Base random seed (overrides the settings file)
    #[arg(long, env = "MEEPLE_SEED")]
    seed: Option<u64>,

    /// Number of players (overrides the settings file)
    #[arg(long)]
    players: Option<usize>,

    /// Tiles per hand (overrides the settings file)
    #[arg(long)]
    hand_size: Option<usize>,

    /// Print the results as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match cli.config {
        Some(ref path) => load_settings(path)?,
        None => load_default_settings(),
    };
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if let Some(players) = cli.players {
        settings.player_count = players;
    }
    if let Some(hand_size) = cli.hand_size {
        settings.hand_size = hand_size;
    }
    settings.validate()?;

    tracing::info!(
        games = cli.games,
        players = settings.player_count,
        hand_size = settings.hand_size,
        seed = settings.seed,
        "starting self-play"
    );
    let result = run_batch(&settings, cli.games, settings.seed)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.summary());
    }
    Ok(())
}
