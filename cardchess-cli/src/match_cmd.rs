//! Match command - play a series of seeded games
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use cardchess_core::{GameConfig, GameState, GreedyPlayer, Side};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Base seed; each game derives its own
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum applied intents per game
    #[arg(long, default_value = "200")]
    pub max_plies: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// How a single game finished
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
enum Outcome {
    Won(Side),
    /// Ended with no winner
    Drawn,
    /// Side to act had no legal intent outside check
    Stalled,
    /// Hit the ply limit
    Unfinished,
}

#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    outcome: Outcome,
    plies: usize,
}

#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    white_wins: usize,
    black_wins: usize,
    drawn: usize,
    stalled: usize,
    unfinished: usize,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Play the games behind a progress bar
/// 2. Report results
pub fn run(args: MatchArgs) -> Result<()> {
    tracing::info!("Starting match: {} games, max {} plies", args.games, args.max_plies);

    let results = play_match(&args);

    report_results(&results, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_match(args: &MatchArgs) -> MatchResults {
    let mut rng = create_rng(args.seed);
    let progress = ProgressBar::new(args.games as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} games {msg}") {
        progress.set_style(style);
    }

    let mut games = Vec::with_capacity(args.games);
    for game_num in 0..args.games {
        let record = play_single_game(game_num + 1, rng.gen(), args.max_plies);
        tracing::debug!(
            "Game {} (seed {}): {:?} after {} plies",
            record.game_number,
            record.seed,
            record.outcome,
            record.plies
        );
        games.push(record);
        progress.inc(1);
    }
    progress.finish_with_message("done");

    compute_match_statistics(games)
}

fn report_results(results: &MatchResults, json: bool) -> Result<()> {
    if json {
        print_json_results(results)
    } else {
        print_text_results(results);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(game_number: usize, seed: u64, max_plies: usize) -> GameRecord {
    let initial = GameState::new(&GameConfig::seeded(seed));
    let (state, history) = GreedyPlayer::with_seed(seed).play_game(initial, max_plies);

    GameRecord {
        game_number,
        seed,
        outcome: classify(&state),
        plies: history.len(),
    }
}

fn classify(state: &GameState) -> Outcome {
    let result = state.evaluate_result();
    match result.winner {
        Some(side) => Outcome::Won(side),
        None if result.is_ended() => Outcome::Drawn,
        None if state.is_stalled() => Outcome::Stalled,
        None => Outcome::Unfinished,
    }
}

fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |outcome: Outcome| games.iter().filter(|g| g.outcome == outcome).count();
    let white_wins = count(Outcome::Won(Side::White));
    let black_wins = count(Outcome::Won(Side::Black));
    let drawn = count(Outcome::Drawn);
    let stalled = count(Outcome::Stalled);
    let unfinished = count(Outcome::Unfinished);

    let total_plies: usize = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    MatchResults {
        games,
        white_wins,
        black_wins,
        drawn,
        stalled,
        unfinished,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &MatchResults) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        seed: u64,
        outcome: Outcome,
        plies: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        white_wins: usize,
        black_wins: usize,
        drawn: usize,
        stalled: usize,
        unfinished: usize,
        avg_plies: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        white_wins: results.white_wins,
        black_wins: results.black_wins,
        drawn: results.drawn,
        stalled: results.stalled,
        unfinished: results.unfinished,
        avg_plies: results.avg_plies,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                seed: g.seed,
                outcome: g.outcome,
                plies: g.plies,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!("White wins:  {} ({:.1}%)", results.white_wins, percent(results.white_wins, total));
    println!("Black wins:  {} ({:.1}%)", results.black_wins, percent(results.black_wins, total));
    if results.drawn > 0 {
        println!("No winner:   {} ({:.1}%)", results.drawn, percent(results.drawn, total));
    }
    println!("Stalled:     {} ({:.1}%)", results.stalled, percent(results.stalled, total));
    println!("Unfinished:  {} ({:.1}%)", results.unfinished, percent(results.unfinished, total));
    println!("Avg plies:   {:.1}", results.avg_plies);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {} (seed {}): {:?} in {} plies",
            game.game_number, game.seed, game.outcome, game.plies
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
