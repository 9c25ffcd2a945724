//! CARDCHESS CLI - Command-line interface
//!
//! Commands:
//! - play: Play a single computer-vs-computer game
//! - match: Play many games and tally the outcomes
//! - serve: Start the HTTP API

mod match_cmd;
mod play_cmd;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardchess")]
#[command(about = "CARDCHESS card-driven chess engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single greedy-vs-greedy game
    Play(play_cmd::PlayArgs),
    /// Play a series of games
    Match(match_cmd::MatchArgs),
    /// Start the HTTP API server
    Serve(server::ServerArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args),
        Commands::Match(args) => match_cmd::run(args),
        Commands::Serve(args) => server::run(args),
    }
}
