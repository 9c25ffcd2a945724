//! Standard chess movement over a board snapshot
//!
//! Everything here is a pure function of the board. Cards, turns and phases
//! are handled by the rules engine on top.

use crate::board::{Board, Side, Square};
use crate::pieces::PieceType;

/// Knight L-offsets
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// One-step offsets in all eight directions
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Destinations of a piece of `side` standing on `from` and moving with the
/// `pattern` piece type's rules
pub fn destinations(board: &Board, from: Square, side: Side, pattern: PieceType) -> Vec<Square> {
    let mut moves = Vec::new();
    match pattern {
        PieceType::Knight => generate_jump_moves(board, from, side, &KNIGHT_OFFSETS, &mut moves),
        PieceType::King => generate_jump_moves(board, from, side, &KING_OFFSETS, &mut moves),
        PieceType::Rook => generate_slide_moves(board, from, side, &ORTHOGONAL, &mut moves),
        PieceType::Bishop => generate_slide_moves(board, from, side, &DIAGONAL, &mut moves),
        PieceType::Queen => {
            generate_slide_moves(board, from, side, &ORTHOGONAL, &mut moves);
            generate_slide_moves(board, from, side, &DIAGONAL, &mut moves);
        }
        PieceType::Pawn => generate_pawn_moves(board, from, side, &mut moves),
    }
    moves
}

/// Whether a piece on `from` attacks `target`
///
/// Pawns attack their two forward diagonals regardless of occupancy; every
/// other piece attacks exactly what it could move to.
pub fn attacks(board: &Board, from: Square, side: Side, piece_type: PieceType, target: Square) -> bool {
    if piece_type == PieceType::Pawn {
        let dr = side.forward();
        return from.offset(-1, dr) == Some(target) || from.offset(1, dr) == Some(target);
    }
    destinations(board, from, side, piece_type).contains(&target)
}

/// Single-hop moves (knight and king): land on empty or enemy squares
fn generate_jump_moves(
    board: &Board,
    from: Square,
    side: Side,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(df, dr) in offsets {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        match board.get(&to) {
            Some(occupant) if occupant.side == side => {}
            _ => moves.push(to),
        }
    }
}

/// Ray moves: stop at the first occupant, include it only if it is an enemy
fn generate_slide_moves(
    board: &Board,
    from: Square,
    side: Side,
    rays: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(df, dr) in rays {
        let mut current = from;
        while let Some(next) = current.offset(df, dr) {
            current = next;
            if let Some(occupant) = board.get(&current) {
                if occupant.side != side {
                    moves.push(current);
                }
                break; // Blocked
            }
            moves.push(current);
        }
    }
}

fn generate_pawn_moves(board: &Board, from: Square, side: Side, moves: &mut Vec<Square>) {
    let dr = side.forward();

    if let Some(one) = from.offset(0, dr) {
        if !board.contains_key(&one) {
            moves.push(one);
            if from.rank() == side.pawn_rank() {
                if let Some(two) = from.offset(0, 2 * dr) {
                    if !board.contains_key(&two) {
                        moves.push(two);
                    }
                }
            }
        }
    }

    // Diagonal captures only
    for df in [-1, 1] {
        if let Some(to) = from.offset(df, dr) {
            if board.get(&to).is_some_and(|occupant| occupant.side != side) {
                moves.push(to);
            }
        }
    }
}
