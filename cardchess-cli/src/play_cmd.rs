//! Play command - one greedy-vs-greedy game
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), play(), report()
//! - Level 3: describe_result()
//! - Level 4: (delegated to cardchess-core)

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rand::Rng;

use cardchess_core::{GameConfig, GameResult, GameState, GreedyPlayer, Intent};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Deck shuffle and player seed (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many applied intents
    #[arg(long, default_value = "200")]
    pub max_plies: usize,

    /// Print the final state as JSON instead of the move list
    #[arg(long)]
    pub json: bool,

    /// GameConfig JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Resolve the game config and seed
/// 2. Play until the game ends, stalls or hits the ply limit
/// 3. Report the intents (or the final state)
pub fn run(args: PlayArgs) -> Result<()> {
    let config = load_config(&args)?;
    let seed = config.seed.unwrap_or(0);

    tracing::info!("Starting game (seed {}, max {} plies)", seed, args.max_plies);

    let (final_state, history) = play(&config, seed, args.max_plies);

    tracing::info!("{}", describe_result(&final_state, history.len()));

    report(&final_state, &history, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Read the config file (if any) and pin the seed
pub(crate) fn load_config(args: &PlayArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if config.seed.is_none() {
        config.seed = Some(rand::thread_rng().gen());
    }
    Ok(config)
}

/// Play one game with both sides driven by the same seeded player
pub(crate) fn play(config: &GameConfig, seed: u64, max_plies: usize) -> (GameState, Vec<Intent>) {
    let initial = GameState::new(config);
    GreedyPlayer::with_seed(seed).play_game(initial, max_plies)
}

fn report(state: &GameState, history: &[Intent], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    for (ply, intent) in history.iter().enumerate() {
        println!("{:>4}. {}", ply + 1, intent);
    }
    println!("\n{}", describe_result(state, history.len()));
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// One-line outcome summary
pub(crate) fn describe_result(state: &GameState, plies: usize) -> String {
    match state.evaluate_result() {
        GameResult { winner: Some(side), reason, .. } => {
            format!("{} wins after {} plies ({:?})", side, plies, reason)
        }
        result if result.is_ended() => format!("Game ended without a winner after {} plies", plies),
        _ if state.is_stalled() => format!("Stalled after {} plies: no legal intent", plies),
        _ => format!("Unfinished after {} plies", plies),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(seed: Option<u64>) -> PlayArgs {
        PlayArgs {
            seed,
            max_plies: 40,
            json: false,
            config: None,
        }
    }

    #[test]
    fn test_seed_overrides_config() {
        let config = load_config(&args(Some(12))).unwrap();
        assert_eq!(config.seed, Some(12));
        assert!(config.auto_place_knights);
    }

    #[test]
    fn test_missing_seed_is_drawn() {
        let config = load_config(&args(None)).unwrap();
        assert!(config.seed.is_some());
    }

    #[test]
    fn test_play_is_reproducible() {
        let config = GameConfig::seeded(3);
        let (a, history_a) = play(&config, 3, 40);
        let (b, history_b) = play(&config, 3, 40);
        assert_eq!(history_a, history_b);
        assert_eq!(a, b);
        assert!(history_a.len() <= 40);
    }

    #[test]
    fn test_describe_unfinished() {
        let config = GameConfig::seeded(3);
        let (state, history) = play(&config, 3, 2);
        assert_eq!(history.len(), 2);
        assert_eq!(describe_result(&state, 2), "Unfinished after 2 plies");
    }
}
