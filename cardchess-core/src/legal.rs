//! Legal-intent generation and card selection queries
//!
//! Candidates are enumerated per card (or card pair), then speculatively
//! applied; only those the executor accepts are returned. While in check this
//! leaves exactly the check-resolving and king-capturing intents.

use crate::board::{Side, Square};
use crate::cards::{CardId, CardKind};
use crate::intent::{
    Action, ActionType, BlockCheckPayload, ComboNnPayload, Intent, KingPlacement, KnightPlacement, MorphMode,
    MorphPayload, MoveStep, PlacePayload, Play, SwapPayload,
};
use crate::movement::{destinations, KING_OFFSETS};
use crate::pieces::{Lifecycle, PieceId, PieceType};
use crate::state::{GameState, Phase, SetupStep, TurnStep};
use crate::threat;
use crate::validate::{board_after_step, flanks, granted_actions};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// SELECTION
// ============================================================================

/// Partial choice made by a player building an intent click by click
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selection {
    /// Unordered card set; empty selects setup intents
    pub cards: Vec<CardId>,
    pub action: Option<ActionType>,
    /// A piece the action moves, places or swaps
    pub piece: Option<PieceId>,
}

impl Selection {
    pub fn cards(cards: impl Into<Vec<CardId>>) -> Self {
        Self { cards: cards.into(), ..Self::default() }
    }

    pub fn with_action(mut self, action: ActionType) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_piece(mut self, piece: PieceId) -> Self {
        self.piece = Some(piece);
        self
    }

    pub fn matches(&self, intent: &Intent) -> bool {
        let cards_match = match &intent.play {
            Some(play) => play.same_cards(&self.cards),
            None => self.cards.is_empty(),
        };
        cards_match
            && self.action.map_or(true, |a| intent.action.action_type() == a)
            && self.piece.map_or(true, |p| intent.action.pieces(intent.side).contains(&p))
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

impl GameState {
    /// Every intent `side` may submit right now
    pub fn legal_intents(&self, side: Side) -> Vec<Intent> {
        match self.phase {
            Phase::Ended { .. } => Vec::new(),
            Phase::Setup { side_to_place, step } if side_to_place == side => self
                .setup_candidates(side, step)
                .into_iter()
                .filter(|intent| self.apply_intent(intent).is_ok())
                .collect(),
            Phase::Turn { side: to_move, step: TurnStep::Play, .. } if to_move == side => self.turn_intents(side),
            _ => Vec::new(),
        }
    }

    /// Legal intents matching a partial selection
    pub fn intents_for_selection(&self, side: Side, selection: &Selection) -> Vec<Intent> {
        self.legal_intents(side)
            .into_iter()
            .filter(|intent| selection.matches(intent))
            .collect()
    }

    /// Distinct action types the selected cards can currently perform
    pub fn available_action_types(&self, side: Side, cards: &[CardId]) -> Vec<ActionType> {
        let mut types: Vec<ActionType> = self
            .intents_for_selection(side, &Selection::cards(cards))
            .iter()
            .map(|intent| intent.action.action_type())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    fn setup_candidates(&self, side: Side, step: SetupStep) -> Vec<Intent> {
        match step {
            SetupStep::PlaceKing => Square::rank_squares(side.back_rank())
                .filter(|sq| !sq.is_corner())
                .map(|to| Intent::setup(side, Action::SetupPlaceKing(KingPlacement { to })))
                .collect(),
            SetupStep::PlaceKnights => threat::king_square(self, side)
                .and_then(flanks)
                .map(|(left, right)| Intent::setup(side, Action::SetupPlaceKnights(KnightPlacement { left, right })))
                .into_iter()
                .collect(),
            SetupStep::Done => Vec::new(),
        }
    }

    /// Legality depends on card kinds only, so each kind (or kind pair) is
    /// generated and filtered once and then attached to every matching card
    fn turn_intents(&self, side: Side) -> Vec<Intent> {
        let hand: Vec<(CardId, CardKind)> = self
            .hand(side)
            .iter()
            .filter_map(|&id| self.card(id).map(|card| (id, card.kind)))
            .collect();
        let mut intents = Vec::new();

        let mut singles: FxHashMap<CardKind, Vec<Action>> = FxHashMap::default();
        for &(card, kind) in &hand {
            let play = Play::single(card);
            let actions = singles
                .entry(kind)
                .or_insert_with(|| self.accepted_actions(side, &play, self.single_candidates(side, kind)));
            intents.extend(actions.iter().map(|a| Intent::turn(side, play.clone(), a.clone())));
        }

        let mut combos: FxHashMap<(CardKind, CardKind), Vec<Action>> = FxHashMap::default();
        for (i, &(card_a, kind_a)) in hand.iter().enumerate() {
            for &(card_b, kind_b) in &hand[i + 1..] {
                if granted_actions(&[kind_a, kind_b]).is_empty() {
                    continue;
                }
                let key = (kind_a.min(kind_b), kind_a.max(kind_b));
                let play = Play::combo(card_a, card_b);
                let actions = combos
                    .entry(key)
                    .or_insert_with(|| self.accepted_actions(side, &play, self.combo_candidates(side, kind_a, kind_b)));
                intents.extend(actions.iter().map(|a| Intent::turn(side, play.clone(), a.clone())));
            }
        }

        intents
    }

    fn accepted_actions(&self, side: Side, play: &Play, candidates: Vec<Action>) -> Vec<Action> {
        candidates
            .into_iter()
            .filter(|action| {
                let intent = Intent::turn(side, play.clone(), action.clone());
                self.apply_intent(&intent).is_ok()
            })
            .collect()
    }

    // ========================================================================
    // SINGLE CARDS
    // ========================================================================

    fn single_candidates(&self, side: Side, kind: CardKind) -> Vec<Action> {
        let mut actions = Vec::new();
        if kind != CardKind::King {
            self.push_placements(side, kind.piece_type(), &mut actions);
        }
        match kind {
            CardKind::Pawn => self.push_standard_moves(side, Some(PieceType::Pawn), Action::MoveStandard, &mut actions),
            CardKind::Knight => self.push_standard_moves(side, None, Action::MoveStandard, &mut actions),
            CardKind::King => self.push_king_nobles(side, &mut actions),
            CardKind::Rook => self.push_swaps(side, &mut actions),
            CardKind::Queen => self.push_standard_moves(side, None, Action::NobleQueen, &mut actions),
            CardKind::Bishop => {
                self.push_resurrections(side, &mut actions);
                self.push_block_checks(side, &mut actions);
            }
        }
        actions
    }

    /// Entry squares for the first unplaced piece of a type
    fn push_placements(&self, side: Side, piece_type: PieceType, out: &mut Vec<Action>) {
        let Some(piece) = self.first_piece(side, piece_type, Lifecycle::Unplaced) else {
            return;
        };
        for to in Square::rank_squares(piece_type.entry_rank(side)) {
            if !self.board.contains_key(&to) {
                out.push(Action::Place(PlacePayload { piece_id: piece.id, to }));
            }
        }
    }

    fn push_standard_moves(
        &self,
        side: Side,
        only: Option<PieceType>,
        wrap: fn(MoveStep) -> Action,
        out: &mut Vec<Action>,
    ) {
        for (piece_id, from) in self.placed(side) {
            if only.is_some_and(|t| t != piece_id.piece_type) {
                continue;
            }
            for to in destinations(&self.board, from, side, piece_id.piece_type) {
                out.push(wrap(MoveStep { piece_id, from, to }));
            }
        }
    }

    fn push_king_nobles(&self, side: Side, out: &mut Vec<Action>) {
        for (piece_id, from) in self.placed(side) {
            if piece_id.piece_type == PieceType::Pawn {
                continue;
            }
            for &(df, dr) in &KING_OFFSETS {
                if let Some(to) = from.offset(df, dr).filter(|to| !self.board.contains_key(to)) {
                    out.push(Action::NobleKing(MoveStep { piece_id, from, to }));
                }
            }
        }
    }

    fn push_swaps(&self, side: Side, out: &mut Vec<Action>) {
        let nobles: Vec<PieceId> = self
            .placed(side)
            .map(|(id, _)| id)
            .filter(|id| id.piece_type != PieceType::Pawn)
            .collect();
        for (i, &piece_a) in nobles.iter().enumerate() {
            for &piece_b in &nobles[i + 1..] {
                out.push(Action::NobleRookSwap(SwapPayload { piece_a, piece_b }));
            }
        }
    }

    fn push_resurrections(&self, side: Side, out: &mut Vec<Action>) {
        let empty_back_rank: Vec<Square> = Square::rank_squares(side.back_rank())
            .filter(|sq| !self.board.contains_key(sq))
            .collect();
        let captured = self.pieces.iter().filter(|p| {
            p.side == side
                && p.lifecycle == Lifecycle::Captured
                && !matches!(p.piece_type, PieceType::King | PieceType::Pawn)
        });
        for piece in captured {
            for &to in &empty_back_rank {
                out.push(Action::NobleBishopResurrect(PlacePayload { piece_id: piece.id, to }));
            }
        }
    }

    /// King step, then any own piece's standard move on the board after it
    fn push_block_checks(&self, side: Side, out: &mut Vec<Action>) {
        if !threat::is_in_check(self, side) {
            return;
        }
        let Some(king_from) = threat::king_square(self, side) else {
            return;
        };
        let king = PieceId::king(side);

        for king_to in destinations(&self.board, king_from, side, PieceType::King) {
            let (board, captured_king) = board_after_step(&self.board, king, king_from, king_to);
            if captured_king {
                out.push(Action::NobleBishopBlockCheck(BlockCheckPayload { king_from, king_to, followup: None }));
                continue;
            }
            for (piece_id, square) in self.placed(side) {
                let from = if piece_id == king { king_to } else { square };
                for to in destinations(&board, from, side, piece_id.piece_type) {
                    out.push(Action::NobleBishopBlockCheck(BlockCheckPayload {
                        king_from,
                        king_to,
                        followup: Some(MoveStep { piece_id, from, to }),
                    }));
                }
            }
        }
    }

    // ========================================================================
    // COMBOS
    // ========================================================================

    fn combo_candidates(&self, side: Side, kind_a: CardKind, kind_b: CardKind) -> Vec<Action> {
        let mut actions = Vec::new();
        match (kind_a, kind_b) {
            (CardKind::Knight, CardKind::Knight) => {
                self.push_double_knights(side, &mut actions);
                self.push_split_knights(side, &mut actions);
            }
            (CardKind::Knight, other) | (other, CardKind::Knight) => self.push_morphs(side, other, &mut actions),
            _ => {}
        }
        actions
    }

    fn knights(&self, side: Side) -> Vec<(PieceId, Square)> {
        self.placed(side)
            .filter(|(id, _)| id.piece_type == PieceType::Knight)
            .collect()
    }

    fn push_double_knights(&self, side: Side, out: &mut Vec<Action>) {
        for (piece_id, from) in self.knights(side) {
            for first in destinations(&self.board, from, side, PieceType::Knight) {
                let (board, captured_king) = board_after_step(&self.board, piece_id, from, first);
                if captured_king {
                    out.push(Action::ComboNn(ComboNnPayload::Double { piece_id, from, moves: vec![first] }));
                    continue;
                }
                for second in destinations(&board, first, side, PieceType::Knight) {
                    out.push(Action::ComboNn(ComboNnPayload::Double {
                        piece_id,
                        from,
                        moves: vec![first, second],
                    }));
                }
            }
        }
    }

    fn push_split_knights(&self, side: Side, out: &mut Vec<Action>) {
        let knights = self.knights(side);
        for (i, &(id_a, from_a)) in knights.iter().enumerate() {
            for &(id_b, from_b) in &knights[i + 1..] {
                let targets_b = destinations(&self.board, from_b, side, PieceType::Knight);
                for to_a in destinations(&self.board, from_a, side, PieceType::Knight) {
                    for &to_b in targets_b.iter().filter(|&&to_b| to_b != to_a) {
                        out.push(Action::ComboNn(ComboNnPayload::Split {
                            a: MoveStep { piece_id: id_a, from: from_a, to: to_a },
                            b: MoveStep { piece_id: id_b, from: from_b, to: to_b },
                        }));
                    }
                }
            }
        }
    }

    fn push_morphs(&self, side: Side, other_kind: CardKind, out: &mut Vec<Action>) {
        let other = other_kind.piece_type();
        for (piece_id, from) in self.placed(side) {
            let mode = match piece_id.piece_type {
                PieceType::Knight => MorphMode::KnightAsOther,
                t if t == other => MorphMode::OtherAsKnight,
                _ => continue,
            };
            let pattern = match mode {
                MorphMode::KnightAsOther => other,
                MorphMode::OtherAsKnight => PieceType::Knight,
            };
            for to in destinations(&self.board, from, side, pattern) {
                out.push(Action::ComboNxMorph(MorphPayload { other_kind, mode, piece_id, from, to }));
            }
        }
    }

    /// Active pieces of a side with their squares, inventory order
    fn placed(&self, side: Side) -> impl Iterator<Item = (PieceId, Square)> + '_ {
        self.active_pieces(side).filter_map(|p| p.square.map(|sq| (p.id, sq)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::sq;
    use crate::config::GameConfig;
    use crate::movement::KNIGHT_OFFSETS;
    use crate::state::fixture::{deal, position};
    use crate::state::EndReason;
    use std::collections::BTreeSet;

    const W_K: PieceId = PieceId::king(Side::White);
    const B_K: PieceId = PieceId::king(Side::Black);
    const W_N1: PieceId = PieceId::new(Side::White, PieceType::Knight, 1);
    const B_R1: PieceId = PieceId::new(Side::Black, PieceType::Rook, 1);

    #[test]
    fn test_setup_intents() {
        let state = GameState::new(&GameConfig::seeded(2));
        let intents = state.legal_intents(Side::White);
        assert_eq!(intents.len(), 6);
        assert!(state.legal_intents(Side::Black).is_empty());

        let next = state.apply_intent(&intents[0]).unwrap();
        let black: Vec<String> = next.legal_intents(Side::Black).iter().map(|i| i.to_string()).collect();
        assert_eq!(black.first().map(String::as_str), Some("Black -> king to b8"));
        assert_eq!(black.len(), 6);
    }

    #[test]
    fn test_manual_knights_single_candidate() {
        let config = GameConfig { auto_place_knights: false, ..GameConfig::seeded(2) };
        let state = GameState::new(&config);
        let king = Intent::setup(Side::White, Action::SetupPlaceKing(KingPlacement { to: sq("g1") }));
        let next = state.apply_intent(&king).unwrap();
        assert_eq!(
            next.legal_intents(Side::White),
            vec![Intent::setup(
                Side::White,
                Action::SetupPlaceKnights(KnightPlacement { left: sq("f1"), right: sq("h1") })
            )]
        );
    }

    #[test]
    fn test_double_knight_reaches_two_hop_squares() {
        let mut state = position(Side::White, &[(W_K, "h1"), (B_K, "h8"), (W_N1, "b1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Knight, CardKind::Knight]);
        let selection = Selection::cards(cards.clone()).with_action(ActionType::ComboNn).with_piece(W_N1);

        let reached: BTreeSet<Square> = state
            .intents_for_selection(Side::White, &selection)
            .iter()
            .filter_map(|intent| match &intent.action {
                Action::ComboNn(ComboNnPayload::Double { moves, .. }) => moves.last().copied(),
                _ => None,
            })
            .collect();

        let hop = |from: Square| -> Vec<Square> {
            KNIGHT_OFFSETS.iter().filter_map(|&(df, dr)| from.offset(df, dr)).collect()
        };
        let one: BTreeSet<Square> = hop(sq("b1")).into_iter().collect();
        let two: BTreeSet<Square> = one.iter().flat_map(|&first| hop(first)).collect();

        assert_eq!(reached, two);
        assert!(reached.contains(&sq("b1")));
        assert!(reached.contains(&sq("e4")));
        assert!(!one.contains(&sq("e4")));
    }

    #[test]
    fn test_in_check_only_resolving_intents() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_R1, "e8"), (B_K, "a8")]);
        let cards = deal(&mut state, Side::White, &[CardKind::King]);
        let intents = state.legal_intents(Side::White);

        let targets: BTreeSet<Square> = intents
            .iter()
            .filter_map(|intent| match &intent.action {
                Action::NobleKing(step) => Some(step.to),
                _ => None,
            })
            .collect();
        let expected: BTreeSet<Square> = ["d1", "d2", "f1", "f2"].into_iter().map(sq).collect();
        assert_eq!(targets, expected);
        assert_eq!(intents.len(), 4);
        assert!(intents.iter().all(|i| i.play == Some(Play::single(cards[0]))));
    }

    #[test]
    fn test_available_action_types() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_N1, "b1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Knight, CardKind::Rook, CardKind::Pawn]);

        assert_eq!(
            state.available_action_types(Side::White, &cards[..1]),
            vec![ActionType::Place, ActionType::MoveStandard]
        );
        assert_eq!(
            state.available_action_types(Side::White, &[cards[1], cards[0]]),
            vec![ActionType::ComboNxMorph]
        );
        // Pawn card: no pawn on the board, placement only
        assert_eq!(state.available_action_types(Side::White, &cards[2..]), vec![ActionType::Place]);
        assert!(state.available_action_types(Side::White, &[cards[0], cards[2]]).is_empty());
    }

    #[test]
    fn test_same_kind_cards_share_actions() {
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "e8"), (W_N1, "b1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Knight, CardKind::Knight]);
        let first = state.intents_for_selection(Side::White, &Selection::cards(vec![cards[0]]));
        let second = state.intents_for_selection(Side::White, &Selection::cards(vec![cards[1]]));
        assert!(!first.is_empty());
        assert_eq!(first.len(), second.len());
        assert!(first.iter().zip(&second).all(|(a, b)| a.action == b.action));
    }

    #[test]
    fn test_block_check_capturing_king_needs_no_followup() {
        // Adjacent enemy king gives check; stepping onto it ends the game
        let mut state = position(Side::White, &[(W_K, "e1"), (B_K, "d2"), (W_N1, "b1")]);
        let cards = deal(&mut state, Side::White, &[CardKind::Bishop]);
        assert!(threat::is_in_check(&state, Side::White));

        let capture = Action::NobleBishopBlockCheck(BlockCheckPayload {
            king_from: sq("e1"),
            king_to: sq("d2"),
            followup: None,
        });
        let intents = state.legal_intents(Side::White);
        let intent = intents
            .iter()
            .find(|i| i.action == capture)
            .cloned()
            .expect("king capture is offered without a followup");
        assert_eq!(intent.play, Some(Play::single(cards[0])));

        // Other king steps still carry a followup
        assert!(intents.iter().all(|i| match &i.action {
            Action::NobleBishopBlockCheck(b) => b.king_to == sq("d2") || b.followup.is_some(),
            _ => true,
        }));

        let next = state.apply_intent(&intent).unwrap();
        assert_eq!(
            next.phase(),
            Phase::Ended { winner: Some(Side::White), reason: EndReason::KingCaptured }
        );
        assert_eq!(next.piece(B_K).unwrap().lifecycle, Lifecycle::Captured);
    }

    #[test]
    fn test_stall_and_checkmate_by_draw() {
        let state = position(Side::White, &[(W_K, "e1"), (B_K, "e8")]);
        assert!(state.legal_intents(Side::White).is_empty());
        assert!(state.is_stalled());

        // Double check (rook on the file, bishop on the diagonal) with only pawn cards to draw
        let b_b1 = PieceId::new(Side::Black, PieceType::Bishop, 1);
        let mut state = position(Side::White, &[(W_K, "e1"), (B_R1, "e8"), (b_b1, "a5"), (B_K, "a8")]);
        let pawn_cards: Vec<CardId> = state
            .card_piles(Side::White)
            .deck
            .iter()
            .copied()
            .filter(|&id| state.card(id).is_some_and(|c| c.kind == CardKind::Pawn))
            .collect();
        state.cards.white.deck = pawn_cards;
        state.phase = Phase::Turn { side: Side::White, step: TurnStep::Draw, extra_turn_queue: 0 };

        let next = state.advance_draw_phase();
        assert_eq!(next.hand(Side::White).len(), 8);
        assert_eq!(
            next.phase(),
            Phase::Ended { winner: Some(Side::Black), reason: EndReason::NoLegalResponseToCheck }
        );
        assert!(!next.is_stalled());
    }
}
