//! Greedy computer opponent and local game loop

use crate::board::Side;
use crate::intent::Intent;
use crate::pieces::{Lifecycle, PieceType};
use crate::state::{GameState, Phase};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Bonus for leaving the opponent in check
const CHECK_BONUS: f32 = 0.25;

/// Noise scale for tie-breaking between equal moves
const NOISE_SCALE: f32 = 0.01;

/// Material value of a captured piece
pub fn piece_value(piece_type: PieceType) -> f32 {
    match piece_type {
        PieceType::Pawn => 1.0,
        PieceType::Knight | PieceType::Bishop => 3.0,
        PieceType::Rook => 5.0,
        PieceType::Queen => 9.0,
        PieceType::King => 0.0,
    }
}

// ============================================================================
// GREEDY PLAYER
// ============================================================================

/// One-ply greedy player
pub struct GreedyPlayer {
    rng: ChaCha8Rng,
}

impl Default for GreedyPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl GreedyPlayer {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Pick an intent for the side to act, `None` when it has nothing legal.
    ///
    /// Setup placements are random. During play an immediate king capture
    /// wins outright; otherwise the highest material gain (plus a check
    /// bonus) is taken.
    pub fn choose(&mut self, state: &GameState) -> Option<Intent> {
        let side = state.side_to_act()?;
        let intents = state.legal_intents(side);

        if matches!(state.phase(), Phase::Setup { .. }) {
            return intents.choose(&mut self.rng).cloned();
        }

        let mut best: Option<(f32, Intent)> = None;
        for intent in intents {
            let Ok(next) = state.apply_intent(&intent) else {
                continue;
            };
            if next.evaluate_result().winner == Some(side) {
                return Some(intent);
            }

            let mut score = material_captured(state, &next, side);
            if next.in_check_flag(side.opponent()) {
                score += CHECK_BONUS;
            }
            score += self.rng.gen::<f32>() * NOISE_SCALE;

            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, intent));
            }
        }
        best.map(|(_, intent)| intent)
    }

    /// Play from `initial` until the game ends, the side to act has no legal
    /// intent, or `max_plies` intents were applied
    pub fn play_game(&mut self, initial: GameState, max_plies: usize) -> (GameState, Vec<Intent>) {
        let mut state = initial;
        let mut history = Vec::new();

        while history.len() < max_plies {
            state = state.advance_draw_phase();
            if state.evaluate_result().is_ended() {
                break;
            }
            let Some(intent) = self.choose(&state) else {
                break;
            };
            match state.apply_intent(&intent) {
                Ok(next) => {
                    state = next;
                    history.push(intent);
                }
                Err(_) => break,
            }
        }

        (state, history)
    }
}

/// Value of enemy pieces captured between two states
fn material_captured(before: &GameState, after: &GameState, side: Side) -> f32 {
    before
        .active_pieces(side.opponent())
        .filter(|p| after.piece(p.id).is_some_and(|q| q.lifecycle == Lifecycle::Captured))
        .map(|p| piece_value(p.piece_type))
        .sum()
}
