//! Intent validation
//!
//! Pure checks against a state snapshot. Self-check is not tested here; the
//! executor rejects it after applying the action.

use crate::board::{Board, Side, Square};
use crate::cards::CardKind;
use crate::error::{Illegal, RulesError};
use crate::intent::{
    Action, ActionType, BlockCheckPayload, ComboNnPayload, Intent, IntentKind, MorphMode, MorphPayload,
    MoveStep, PlacePayload, Play, PlayMode, SwapPayload,
};
use crate::movement;
use crate::pieces::{Lifecycle, Piece, PieceId, PieceType};
use crate::state::{GameState, Phase, SetupStep, TurnStep};
use crate::threat;

/// Check an intent against the state without mutating it
pub fn validate_intent(state: &GameState, intent: &Intent) -> Result<(), RulesError> {
    match (state.phase(), intent.kind) {
        (Phase::Ended { .. }, _) => Err(Illegal::GameOver.into()),
        (Phase::Setup { side_to_place, step }, IntentKind::Setup) => {
            validate_setup(state, intent, side_to_place, step)
        }
        (Phase::Setup { .. }, IntentKind::Turn) => Err(Illegal::SetupInProgress.into()),
        (Phase::Turn { .. }, IntentKind::Setup) => Err(Illegal::NotInSetup.into()),
        (Phase::Turn { side, step, .. }, IntentKind::Turn) => {
            if intent.side != side {
                return Err(Illegal::WrongSide { expected: side }.into());
            }
            if step != TurnStep::Play {
                return Err(Illegal::AwaitingDraw.into());
            }
            let play = intent.play.as_ref().ok_or(Illegal::MissingPlay)?;
            let kinds = validate_play(state, side, play)?;
            validate_grant(&kinds, &intent.action)?;
            validate_action(state, side, &intent.action)
        }
    }
}

/// Action types a single card or a card pair grants, kinds in play order
pub fn granted_actions(kinds: &[CardKind]) -> Vec<ActionType> {
    use ActionType::*;
    match kinds {
        [CardKind::Pawn] | [CardKind::Knight] => vec![Place, MoveStandard],
        [CardKind::King] => vec![NobleKing],
        [CardKind::Rook] => vec![Place, NobleRookSwap],
        [CardKind::Queen] => vec![Place, NobleQueen],
        [CardKind::Bishop] => vec![Place, NobleBishopResurrect, NobleBishopBlockCheck],
        [CardKind::Knight, CardKind::Knight] => vec![ComboNn],
        [CardKind::Knight, other] | [other, CardKind::Knight] if other.is_noble() => vec![ComboNxMorph],
        _ => vec![],
    }
}

/// West and east neighbours of a king square
pub(crate) fn flanks(king: Square) -> Option<(Square, Square)> {
    Some((king.offset(-1, 0)?, king.offset(1, 0)?))
}

/// Board after one piece moves, and whether the step captured a king
pub(crate) fn board_after_step(board: &Board, id: PieceId, from: Square, to: Square) -> (Board, bool) {
    let mut next = board.clone();
    next.remove(&from);
    let captured = next.insert(to, id);
    (next, captured.is_some_and(|c| c.piece_type == PieceType::King))
}

// ============================================================================
// SETUP
// ============================================================================

fn validate_setup(state: &GameState, intent: &Intent, side_to_place: Side, step: SetupStep) -> Result<(), RulesError> {
    let side = intent.side;
    if side != side_to_place {
        return Err(Illegal::WrongSide { expected: side_to_place }.into());
    }

    match (step, &intent.action) {
        (SetupStep::PlaceKing, Action::SetupPlaceKing(king)) => {
            let to = king.to;
            if to.rank() != side.back_rank() {
                return Err(Illegal::KingNotOnBackRank.into());
            }
            if to.is_corner() {
                return Err(Illegal::KingInCorner.into());
            }
            let (left, right) = flanks(to).ok_or(Illegal::KingInCorner)?;
            for square in [to, left, right] {
                ensure_empty(state.board(), square)?;
            }
            Ok(())
        }
        (SetupStep::PlaceKing, _) => Err(Illegal::WrongSetupStep { expected: "SETUP_PLACE_KING" }.into()),

        (SetupStep::PlaceKnights, Action::SetupPlaceKnights(knights)) => {
            let king = threat::king_square(state, side)
                .ok_or_else(|| RulesError::invariant(format!("{side} king missing during knight setup")))?;
            let (left, right) = flanks(king)
                .ok_or_else(|| RulesError::invariant(format!("{side} king placed on {king}")))?;
            if knights.left != left || knights.right != right {
                return Err(Illegal::KnightsNotFlanking { left, right }.into());
            }
            ensure_empty(state.board(), left)?;
            ensure_empty(state.board(), right)?;
            Ok(())
        }
        (SetupStep::PlaceKnights, _) => Err(Illegal::WrongSetupStep { expected: "SETUP_PLACE_KNIGHTS" }.into()),

        (SetupStep::Done, _) => Err(RulesError::invariant("setup phase with step DONE")),
    }
}

// ============================================================================
// CARDS
// ============================================================================

/// Card count, ownership, hand membership and combo pairing.
/// Returns the played kinds in play order.
fn validate_play(state: &GameState, side: Side, play: &Play) -> Result<Vec<CardKind>, Illegal> {
    let expected = match play.mode {
        PlayMode::Single => 1,
        PlayMode::Combo => 2,
    };
    if play.card_ids.len() != expected {
        return Err(Illegal::BadCardCount);
    }

    let mut kinds = Vec::with_capacity(expected);
    for (i, &id) in play.card_ids.iter().enumerate() {
        if play.card_ids[..i].contains(&id) {
            return Err(Illegal::DuplicateCard(id));
        }
        let card = state.card(id).ok_or(Illegal::CardNotInHand(id))?;
        if card.owner != side {
            return Err(Illegal::NotYourCard(id, side));
        }
        if !state.hand(side).contains(&id) {
            return Err(Illegal::CardNotInHand(id));
        }
        kinds.push(card.kind);
    }

    if play.mode == PlayMode::Combo {
        validate_combo(&kinds)?;
    }
    Ok(kinds)
}

fn validate_combo(kinds: &[CardKind]) -> Result<(), Illegal> {
    if kinds.contains(&CardKind::Pawn) {
        return Err(Illegal::PawnInCombo);
    }
    match kinds.iter().filter(|&&k| k == CardKind::Knight).count() {
        0 => Err(Illegal::ComboWithoutKnight),
        1 => match kinds.iter().find(|&&k| k != CardKind::Knight) {
            Some(&other) if !other.is_noble() => Err(Illegal::BadComboPartner(other)),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

/// The cards must grant the action type, and card-specific payload limits hold
fn validate_grant(kinds: &[CardKind], action: &Action) -> Result<(), Illegal> {
    if !granted_actions(kinds).contains(&action.action_type()) {
        return Err(Illegal::NotGrantedByCards);
    }

    match (kinds, action) {
        ([kind], Action::Place(p)) if p.piece_id.piece_type != kind.piece_type() => {
            Err(Illegal::WrongPieceType(p.piece_id))
        }
        ([CardKind::Pawn], Action::MoveStandard(m)) if m.piece_id.piece_type != PieceType::Pawn => {
            Err(Illegal::WrongPieceType(m.piece_id))
        }
        ([a, b], Action::ComboNxMorph(m)) => {
            let partner = if *a == CardKind::Knight { *b } else { *a };
            if m.other_kind == partner {
                Ok(())
            } else {
                Err(Illegal::NotGrantedByCards)
            }
        }
        _ => Ok(()),
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

fn validate_action(state: &GameState, side: Side, action: &Action) -> Result<(), RulesError> {
    match action {
        Action::SetupPlaceKing(_) | Action::SetupPlaceKnights(_) => Err(Illegal::NotInSetup.into()),
        Action::Place(p) => validate_place(state, side, p),
        Action::MoveStandard(step) | Action::NobleQueen(step) => {
            let piece = active_at(state, side, step.piece_id, step.from)?;
            reach(state.board(), step, piece.piece_type)?;
            Ok(())
        }
        Action::NobleKing(step) => validate_noble_king(state, side, step),
        Action::NobleRookSwap(swap) => validate_swap(state, side, swap),
        Action::NobleBishopResurrect(p) => validate_resurrect(state, side, p),
        Action::NobleBishopBlockCheck(b) => validate_block_check(state, side, b),
        Action::ComboNn(ComboNnPayload::Double { piece_id, from, moves }) => {
            validate_double(state, side, *piece_id, *from, moves)
        }
        Action::ComboNn(ComboNnPayload::Split { a, b }) => validate_split(state, side, a, b),
        Action::ComboNxMorph(m) => validate_morph(state, side, m),
    }
}

fn validate_place(state: &GameState, side: Side, p: &PlacePayload) -> Result<(), RulesError> {
    let piece = own_piece(state, side, p.piece_id)?;
    if piece.piece_type == PieceType::King {
        return Err(Illegal::KingNotPlaceable.into());
    }
    expect_lifecycle(piece, Lifecycle::Unplaced)?;
    if p.to.rank() != piece.piece_type.entry_rank(side) {
        return Err(Illegal::WrongEntryRank { piece: p.piece_id, to: p.to }.into());
    }
    ensure_empty(state.board(), p.to)?;
    Ok(())
}

fn validate_noble_king(state: &GameState, side: Side, step: &MoveStep) -> Result<(), RulesError> {
    let piece = active_at(state, side, step.piece_id, step.from)?;
    if piece.piece_type == PieceType::Pawn {
        return Err(Illegal::WrongPieceType(step.piece_id).into());
    }
    if !step.from.is_adjacent(step.to) || state.board().contains_key(&step.to) {
        return Err(Illegal::NotAdjacentEmpty(step.to).into());
    }
    Ok(())
}

fn validate_swap(state: &GameState, side: Side, swap: &SwapPayload) -> Result<(), RulesError> {
    if swap.piece_a == swap.piece_b {
        return Err(Illegal::SwapWithSelf.into());
    }
    for id in [swap.piece_a, swap.piece_b] {
        let piece = own_piece(state, side, id)?;
        expect_lifecycle(piece, Lifecycle::Active)?;
        if piece.piece_type == PieceType::Pawn {
            return Err(Illegal::WrongPieceType(id).into());
        }
    }
    Ok(())
}

fn validate_resurrect(state: &GameState, side: Side, p: &PlacePayload) -> Result<(), RulesError> {
    let piece = own_piece(state, side, p.piece_id)?;
    match piece.piece_type {
        PieceType::King => return Err(Illegal::KingNotPlaceable.into()),
        PieceType::Pawn => return Err(Illegal::WrongPieceType(p.piece_id).into()),
        _ => {}
    }
    expect_lifecycle(piece, Lifecycle::Captured)?;
    if p.to.rank() != side.back_rank() {
        return Err(Illegal::WrongEntryRank { piece: p.piece_id, to: p.to }.into());
    }
    ensure_empty(state.board(), p.to)?;
    Ok(())
}

fn validate_block_check(state: &GameState, side: Side, b: &BlockCheckPayload) -> Result<(), RulesError> {
    if !threat::is_in_check(state, side) {
        return Err(Illegal::NotInCheck.into());
    }

    let king = PieceId::king(side);
    let king_step = MoveStep { piece_id: king, from: b.king_from, to: b.king_to };
    active_at(state, side, king, b.king_from)?;
    reach(state.board(), &king_step, PieceType::King)?;

    let (board, captured_king) = board_after_step(state.board(), king, b.king_from, b.king_to);
    match b.followup {
        None if captured_king => Ok(()),
        None => Err(Illegal::MissingFollowup.into()),
        Some(step) => {
            let piece = own_piece(state, side, step.piece_id)?;
            expect_lifecycle(piece, Lifecycle::Active)?;
            if board.get(&step.from) != Some(&step.piece_id) {
                return Err(Illegal::FromMismatch { piece: step.piece_id, from: step.from }.into());
            }
            reach(&board, &step, piece.piece_type)?;
            Ok(())
        }
    }
}

fn validate_double(
    state: &GameState,
    side: Side,
    piece_id: PieceId,
    from: Square,
    moves: &[Square],
) -> Result<(), RulesError> {
    let piece = active_at(state, side, piece_id, from)?;
    if piece.piece_type != PieceType::Knight {
        return Err(Illegal::WrongPieceType(piece_id).into());
    }

    let (first, second) = match moves {
        [] => return Err(Illegal::MissingSecondStep.into()),
        [first] => (*first, None),
        [first, second] => (*first, Some(*second)),
        _ => return Err(Illegal::TooManySteps.into()),
    };

    let step = MoveStep { piece_id, from, to: first };
    reach(state.board(), &step, PieceType::Knight)?;
    let (board, captured_king) = board_after_step(state.board(), piece_id, from, first);

    match second {
        None if captured_king => Ok(()),
        None => Err(Illegal::MissingSecondStep.into()),
        Some(to) => {
            reach(&board, &MoveStep { piece_id, from: first, to }, PieceType::Knight)?;
            Ok(())
        }
    }
}

/// Both knights move on the pre-move board
fn validate_split(state: &GameState, side: Side, a: &MoveStep, b: &MoveStep) -> Result<(), RulesError> {
    if a.piece_id == b.piece_id || a.to == b.to {
        return Err(Illegal::SplitOverlap.into());
    }
    for step in [a, b] {
        let piece = active_at(state, side, step.piece_id, step.from)?;
        if piece.piece_type != PieceType::Knight {
            return Err(Illegal::WrongPieceType(step.piece_id).into());
        }
        reach(state.board(), step, PieceType::Knight)?;
    }
    Ok(())
}

fn validate_morph(state: &GameState, side: Side, m: &MorphPayload) -> Result<(), RulesError> {
    let piece = active_at(state, side, m.piece_id, m.from)?;
    let other = m.other_kind.piece_type();
    let (required, pattern) = match m.mode {
        MorphMode::KnightAsOther => (PieceType::Knight, other),
        MorphMode::OtherAsKnight => (other, PieceType::Knight),
    };
    if piece.piece_type != required {
        return Err(Illegal::WrongPieceType(m.piece_id).into());
    }
    reach(state.board(), &MoveStep { piece_id: m.piece_id, from: m.from, to: m.to }, pattern)?;
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn own_piece(state: &GameState, side: Side, id: PieceId) -> Result<&Piece, Illegal> {
    let piece = state.piece(id).ok_or(Illegal::UnknownPiece(id))?;
    if piece.side != side {
        return Err(Illegal::NotYourPiece(id, side));
    }
    Ok(piece)
}

fn expect_lifecycle(piece: &Piece, expected: Lifecycle) -> Result<(), Illegal> {
    if piece.lifecycle != expected {
        return Err(Illegal::WrongLifecycle { piece: piece.id, expected, actual: piece.lifecycle });
    }
    Ok(())
}

/// Own ACTIVE piece standing on `from`
fn active_at(state: &GameState, side: Side, id: PieceId, from: Square) -> Result<&Piece, Illegal> {
    let piece = own_piece(state, side, id)?;
    expect_lifecycle(piece, Lifecycle::Active)?;
    if piece.square != Some(from) {
        return Err(Illegal::FromMismatch { piece: id, from });
    }
    Ok(piece)
}

fn reach(board: &Board, step: &MoveStep, pattern: PieceType) -> Result<(), Illegal> {
    if movement::destinations(board, step.from, step.piece_id.side, pattern).contains(&step.to) {
        Ok(())
    } else {
        Err(Illegal::UnreachableSquare { piece: step.piece_id, to: step.to })
    }
}

fn ensure_empty(board: &Board, square: Square) -> Result<(), Illegal> {
    if board.contains_key(&square) {
        return Err(Illegal::Occupied(square));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::sq;
    use crate::config::GameConfig;
    use crate::intent::KingPlacement;
    use crate::state::fixture::{capture, deal, position};

    const W_K: PieceId = PieceId::king(Side::White);
    const B_K: PieceId = PieceId::king(Side::Black);
    const W_N1: PieceId = PieceId::new(Side::White, PieceType::Knight, 1);
    const W_R1: PieceId = PieceId::new(Side::White, PieceType::Rook, 1);
    const W_P1: PieceId = PieceId::new(Side::White, PieceType::Pawn, 1);
    const B_R1: PieceId = PieceId::new(Side::Black, PieceType::Rook, 1);

    fn illegal(result: Result<(), RulesError>) -> Illegal {
        match result {
            Err(RulesError::IllegalIntent(reason)) => reason,
            other => panic!("expected an illegal intent, got {other:?}"),
        }
    }

    fn step(piece_id: PieceId, from: &str, to: &str) -> MoveStep {
        MoveStep { piece_id, from: sq(from), to: sq(to) }
    }

    #[test]
    fn test_king_setup_rules() {
        let state = GameState::new(&GameConfig::seeded(1));
        let place = |to: &str| Intent::setup(Side::White, Action::SetupPlaceKing(KingPlacement { to: sq(to) }));

        assert!(validate_intent(&state, &place("e1")).is_ok());
        assert_eq!(illegal(validate_intent(&state, &place("e2"))), Illegal::KingNotOnBackRank);
        assert_eq!(illegal(validate_intent(&state, &place("h1"))), Illegal::KingInCorner);

        let black = Intent::setup(Side::Black, Action::SetupPlaceKing(KingPlacement { to: sq("e8") }));
        assert_eq!(
            illegal(validate_intent(&state, &black)),
            Illegal::WrongSide { expected: Side::White }
        );
    }

    #[test]
    fn test_turn_requires_play_step() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_N1, "b1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Knight]);
        let intent = Intent::turn(Side::White, Play::single(cards[0]), Action::MoveStandard(step(W_N1, "b1", "c3")));
        assert!(validate_intent(&state, &intent).is_ok());

        state.phase = Phase::Turn { side: Side::White, step: TurnStep::Draw, extra_turn_queue: 0 };
        assert_eq!(illegal(validate_intent(&state, &intent)), Illegal::AwaitingDraw);

        state.phase = Phase::Turn { side: Side::Black, step: TurnStep::Play, extra_turn_queue: 0 };
        assert_eq!(
            illegal(validate_intent(&state, &intent)),
            Illegal::WrongSide { expected: Side::Black }
        );
    }

    #[test]
    fn test_card_checks() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_P1, "a2"), (W_N1, "b1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Pawn, CardKind::Knight, CardKind::Rook]);
        let pawn_move = Action::MoveStandard(step(W_P1, "a2", "a4"));

        let not_in_hand = state.card_piles(Side::White).deck[0];
        let intent = Intent::turn(Side::White, Play::single(not_in_hand), pawn_move.clone());
        assert_eq!(illegal(validate_intent(&state, &intent)), Illegal::CardNotInHand(not_in_hand));

        let black_card = state.card_piles(Side::Black).deck[0];
        let intent = Intent::turn(Side::White, Play::single(black_card), pawn_move.clone());
        assert_eq!(illegal(validate_intent(&state, &intent)), Illegal::NotYourCard(black_card, Side::White));

        let intent = Intent::turn(Side::White, Play::combo(cards[0], cards[1]), pawn_move.clone());
        assert_eq!(illegal(validate_intent(&state, &intent)), Illegal::PawnInCombo);

        let intent = Intent::turn(Side::White, Play::combo(cards[1], cards[1]), pawn_move.clone());
        assert_eq!(illegal(validate_intent(&state, &intent)), Illegal::DuplicateCard(cards[1]));

        let intent = Intent::turn(Side::White, Play::combo(cards[1], cards[2]), pawn_move.clone());
        assert_eq!(illegal(validate_intent(&state, &intent)), Illegal::NotGrantedByCards);

        // Pawn card only moves pawns
        let intent = Intent::turn(Side::White, Play::single(cards[0]), Action::MoveStandard(step(W_N1, "b1", "c3")));
        assert_eq!(illegal(validate_intent(&state, &intent)), Illegal::WrongPieceType(W_N1));

        let intent = Intent::turn(Side::White, Play::single(cards[0]), pawn_move);
        assert!(validate_intent(&state, &intent).is_ok());
    }

    #[test]
    fn test_combo_needs_knight() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_R1, "a1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Rook, CardKind::Queen]);
        let swap = Action::NobleRookSwap(SwapPayload { piece_a: W_R1, piece_b: W_K });
        let intent = Intent::turn(Side::White, Play::combo(cards[0], cards[1]), swap);
        assert_eq!(illegal(validate_intent(&state, &intent)), Illegal::ComboWithoutKnight);
    }

    #[test]
    fn test_place_rules() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Rook, CardKind::Pawn]);
        let place = |card, piece_id, to: &str| {
            Intent::turn(Side::White, Play::single(card), Action::Place(PlacePayload { piece_id, to: sq(to) }))
        };

        assert!(validate_intent(&state, &place(cards[0], W_R1, "a1")).is_ok());
        assert!(validate_intent(&state, &place(cards[1], W_P1, "c2")).is_ok());
        assert_eq!(
            illegal(validate_intent(&state, &place(cards[0], W_R1, "a2"))),
            Illegal::WrongEntryRank { piece: W_R1, to: sq("a2") }
        );
        assert_eq!(
            illegal(validate_intent(&state, &place(cards[0], W_R1, "e1"))),
            Illegal::Occupied(sq("e1"))
        );
        assert_eq!(
            illegal(validate_intent(&state, &place(cards[1], W_R1, "a1"))),
            Illegal::WrongPieceType(W_R1)
        );
    }

    #[test]
    fn test_noble_king_cannot_capture() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_R1, "d4"), (B_R1, "d5")]);
        let cards = deal(&mut state, Side::White, &[CardKind::King]);
        let noble = |to: &str| {
            Intent::turn(Side::White, Play::single(cards[0]), Action::NobleKing(step(W_R1, "d4", to)))
        };
        assert!(validate_intent(&state, &noble("c5")).is_ok());
        assert_eq!(illegal(validate_intent(&state, &noble("d5"))), Illegal::NotAdjacentEmpty(sq("d5")));
        assert_eq!(illegal(validate_intent(&state, &noble("d6"))), Illegal::NotAdjacentEmpty(sq("d6")));
    }

    #[test]
    fn test_resurrect_rules() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_R1, "a1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Bishop]);
        let resurrect = |piece_id, to: &str| {
            Intent::turn(
                Side::White,
                Play::single(cards[0]),
                Action::NobleBishopResurrect(PlacePayload { piece_id, to: sq(to) }),
            )
        };

        assert_eq!(
            illegal(validate_intent(&state, &resurrect(W_R1, "b1"))),
            Illegal::WrongLifecycle { piece: W_R1, expected: Lifecycle::Captured, actual: Lifecycle::Active }
        );
        capture(&mut state, W_R1);
        assert!(validate_intent(&state, &resurrect(W_R1, "h1")).is_ok());
        assert_eq!(illegal(validate_intent(&state, &resurrect(W_K, "h1"))), Illegal::KingNotPlaceable);
    }

    #[test]
    fn test_block_check_only_in_check() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_N1, "b1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Bishop]);
        let block = BlockCheckPayload {
            king_from: sq("e1"),
            king_to: sq("f2"),
            followup: Some(step(W_N1, "b1", "c3")),
        };
        let intent = Intent::turn(Side::White, Play::single(cards[0]), Action::NobleBishopBlockCheck(block));
        assert_eq!(illegal(validate_intent(&state, &intent)), Illegal::NotInCheck);
    }

    #[test]
    fn test_double_knight_second_step_uses_intermediate_board() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_N1, "b1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Knight, CardKind::Knight]);
        let double = |moves: &[&str]| {
            Intent::turn(
                Side::White,
                Play::combo(cards[0], cards[1]),
                Action::ComboNn(ComboNnPayload::Double {
                    piece_id: W_N1,
                    from: sq("b1"),
                    moves: moves.iter().map(|m| sq(m)).collect(),
                }),
            )
        };

        // b1 is vacated by the first step
        assert!(validate_intent(&state, &double(&["c3", "b1"])).is_ok());
        assert!(validate_intent(&state, &double(&["c3", "d5"])).is_ok());
        assert_eq!(illegal(validate_intent(&state, &double(&["c3"]))), Illegal::MissingSecondStep);
        assert_eq!(
            illegal(validate_intent(&state, &double(&["c3", "c4"]))),
            Illegal::UnreachableSquare { piece: W_N1, to: sq("c4") }
        );
    }

    #[test]
    fn test_split_is_symmetric() {
        let w_n2 = PieceId::new(Side::White, PieceType::Knight, 2);
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_N1, "b1"), (w_n2, "g1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Knight, CardKind::Knight]);
        let split = |a: MoveStep, b: MoveStep| {
            Intent::turn(Side::White, Play::combo(cards[0], cards[1]), Action::ComboNn(ComboNnPayload::Split { a, b }))
        };

        let a = step(W_N1, "b1", "c3");
        let b = step(w_n2, "g1", "f3");
        assert!(validate_intent(&state, &split(a, b)).is_ok());
        assert!(validate_intent(&state, &split(b, a)).is_ok());

        assert_eq!(
            illegal(validate_intent(&state, &split(step(W_N1, "b1", "d2"), step(w_n2, "g1", "d2")))),
            Illegal::SplitOverlap
        );
        assert_eq!(illegal(validate_intent(&state, &split(a, a))), Illegal::SplitOverlap);
    }

    #[test]
    fn test_morph_modes() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_N1, "b1"), (W_R1, "a1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Knight, CardKind::Rook]);
        let morph = |other_kind, mode, piece_id, from: &str, to: &str| {
            Intent::turn(
                Side::White,
                Play::combo(cards[0], cards[1]),
                Action::ComboNxMorph(MorphPayload { other_kind, mode, piece_id, from: sq(from), to: sq(to) }),
            )
        };

        assert!(validate_intent(&state, &morph(CardKind::Rook, MorphMode::KnightAsOther, W_N1, "b1", "b7")).is_ok());
        assert!(validate_intent(&state, &morph(CardKind::Rook, MorphMode::OtherAsKnight, W_R1, "a1", "b3")).is_ok());
        assert_eq!(
            illegal(validate_intent(&state, &morph(CardKind::Queen, MorphMode::KnightAsOther, W_N1, "b1", "b7"))),
            Illegal::NotGrantedByCards
        );
        assert_eq!(
            illegal(validate_intent(&state, &morph(CardKind::Rook, MorphMode::OtherAsKnight, W_N1, "b1", "c3"))),
            Illegal::WrongPieceType(W_N1)
        );
    }

    #[test]
    fn test_grant_table() {
        assert_eq!(granted_actions(&[CardKind::King]), vec![ActionType::NobleKing]);
        assert_eq!(granted_actions(&[CardKind::Bishop, CardKind::Knight]), vec![ActionType::ComboNxMorph]);
        assert!(granted_actions(&[CardKind::Pawn, CardKind::Knight]).is_empty());
        assert!(granted_actions(&[CardKind::Rook, CardKind::Queen]).is_empty());
    }
}
