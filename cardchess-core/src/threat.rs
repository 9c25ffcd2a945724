//! Check detection

use crate::board::{Board, Side, Square};
use crate::movement;
use crate::pieces::PieceId;
use crate::state::GameState;

/// Square of a side's king, `None` unless it is ACTIVE
pub fn king_square(state: &GameState, side: Side) -> Option<Square> {
    state
        .piece(PieceId::king(side))
        .filter(|k| k.is_active())
        .and_then(|k| k.square)
}

/// Whether any piece of `attacker` on `board` attacks `target`
pub fn square_attacked_by(board: &Board, target: Square, attacker: Side) -> bool {
    board
        .iter()
        .filter(|(_, id)| id.side == attacker)
        .any(|(&from, id)| movement::attacks(board, from, attacker, id.piece_type, target))
}

/// Some active enemy piece attacks the side's king; false without a king
pub fn is_in_check(state: &GameState, side: Side) -> bool {
    match king_square(state, side) {
        Some(king) => square_attacked_by(state.board(), king, side.opponent()),
        None => false,
    }
}
