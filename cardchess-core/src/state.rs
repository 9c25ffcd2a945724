//! Game state: board, pieces, card piles, phase and threat flags

use crate::board::{Board, BySide, Side, Square};
use crate::cards::{build_card_instances, Card, CardId, CardPiles, HAND_SIZE};
use crate::config::GameConfig;
use crate::error::RulesError;
use crate::intent::Intent;
use crate::pieces::{initial_pieces, Lifecycle, Piece, PieceId, PieceType};
use crate::threat;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// PHASE
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetupStep {
    PlaceKing,
    PlaceKnights,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnStep {
    Draw,
    Play,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndReason {
    KingCaptured,
    NoLegalResponseToCheck,
}

/// Setup -> Turn -> Ended, never backwards
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[serde(rename_all = "camelCase")]
    Setup { side_to_place: Side, step: SetupStep },
    #[serde(rename_all = "camelCase")]
    Turn { side: Side, step: TurnStep, extra_turn_queue: u32 },
    Ended { winner: Option<Side>, reason: EndReason },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Ongoing,
    Ended,
}

/// Result summary returned by `evaluate_result`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub status: GameStatus,
    pub winner: Option<Side>,
    pub reason: Option<EndReason>,
}

impl GameResult {
    pub const ONGOING: GameResult = GameResult { status: GameStatus::Ongoing, winner: None, reason: None };

    pub fn is_ended(&self) -> bool {
        self.status == GameStatus::Ended
    }
}

/// One applied intent, oldest first in `GameState::log`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub side: Side,
    pub intent: Intent,
    pub summary: String,
}

impl LogEntry {
    pub fn new(intent: &Intent) -> Self {
        Self {
            side: intent.side,
            intent: intent.clone(),
            summary: intent.to_string(),
        }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Authoritative game record (clone to mutate)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) phase: Phase,

    /// Inverse of the ACTIVE pieces' squares
    pub(crate) board: Board,

    /// Fixed inventory, White first
    pub(crate) pieces: Vec<Piece>,

    /// All 64 card instances, indexed by id - 1
    pub(crate) card_instances: Vec<Card>,
    pub(crate) cards: BySide<CardPiles>,

    pub(crate) in_check: BySide<bool>,

    /// Seed of the next reshuffle
    pub(crate) shuffle_seed: u64,

    #[serde(default)]
    pub(crate) log: Vec<LogEntry>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Fresh game: everything unplaced, decks shuffled, White places first
    pub fn new(config: &GameConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let card_instances = build_card_instances();
        let mut cards: BySide<CardPiles> = BySide::default();
        for card in &card_instances {
            cards.get_mut(card.owner).deck.push(card.id);
        }
        cards.white.deck.shuffle(&mut rng);
        cards.black.deck.shuffle(&mut rng);

        Self {
            config: config.clone(),
            phase: Phase::Setup {
                side_to_place: Side::White,
                step: SetupStep::PlaceKing,
            },
            board: Board::default(),
            pieces: initial_pieces(),
            card_instances,
            cards,
            in_check: BySide::default(),
            shuffle_seed: rng.gen(),
            log: Vec::new(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Every applied intent so far
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    /// Piece standing on a square
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.board.get(&square).and_then(|&id| self.piece(id))
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.card_instances.get(i))
            .filter(|c| c.id == id)
    }

    pub fn card_piles(&self, side: Side) -> &CardPiles {
        self.cards.get(side)
    }

    pub fn hand(&self, side: Side) -> &[CardId] {
        &self.cards.get(side).hand
    }

    /// Cached check flag, refreshed after each action and draw
    pub fn in_check_flag(&self, side: Side) -> bool {
        *self.in_check.get(side)
    }

    /// Live check test
    pub fn is_in_check(&self, side: Side) -> bool {
        threat::is_in_check(self, side)
    }

    /// Side expected to submit the next intent, if any
    pub fn side_to_act(&self) -> Option<Side> {
        match self.phase {
            Phase::Setup { side_to_place, .. } => Some(side_to_place),
            Phase::Turn { side, .. } => Some(side),
            Phase::Ended { .. } => None,
        }
    }

    pub fn is_awaiting_draw(&self) -> bool {
        matches!(self.phase, Phase::Turn { step: TurnStep::Draw, .. })
    }

    /// Active pieces of a side, inventory order
    pub fn active_pieces(&self, side: Side) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(move |p| p.side == side && p.is_active())
    }

    /// First piece of a side/type with the given lifecycle, inventory order
    pub fn first_piece(&self, side: Side, piece_type: PieceType, lifecycle: Lifecycle) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|p| p.side == side && p.piece_type == piece_type && p.lifecycle == lifecycle)
    }

    // ========================================================================
    // RESULT
    // ========================================================================

    /// `{status, winner, reason}`; a captured king counts as ended even if
    /// the phase was never closed
    pub fn evaluate_result(&self) -> GameResult {
        if let Phase::Ended { winner, reason } = self.phase {
            return GameResult { status: GameStatus::Ended, winner, reason: Some(reason) };
        }

        let king_alive = |side| {
            self.piece(PieceId::king(side))
                .is_some_and(|k| k.lifecycle != Lifecycle::Captured)
        };
        match (king_alive(Side::White), king_alive(Side::Black)) {
            (true, true) => GameResult::ONGOING,
            (false, true) => GameResult {
                status: GameStatus::Ended,
                winner: Some(Side::Black),
                reason: Some(EndReason::KingCaptured),
            },
            (true, false) => GameResult {
                status: GameStatus::Ended,
                winner: Some(Side::White),
                reason: Some(EndReason::KingCaptured),
            },
            (false, false) => GameResult {
                status: GameStatus::Ended,
                winner: None,
                reason: Some(EndReason::KingCaptured),
            },
        }
    }

    /// A play step with no legal intents while not in check (no rule covers it)
    pub fn is_stalled(&self) -> bool {
        match self.phase {
            Phase::Turn { side, step: TurnStep::Play, .. } => {
                !self.is_in_check(side) && self.legal_intents(side).is_empty()
            }
            _ => false,
        }
    }

    // ========================================================================
    // DRAW STEP
    // ========================================================================

    /// Refill the hand of the side in its DRAW step, then switch to PLAY.
    /// Returns an unchanged copy in any other phase or step.
    pub fn advance_draw_phase(&self) -> Self {
        let mut next = self.clone();
        let Phase::Turn { side, step: TurnStep::Draw, extra_turn_queue } = next.phase else {
            return next;
        };

        next.draw_to_hand_size(side);
        next.phase = Phase::Turn { side, step: TurnStep::Play, extra_turn_queue };
        next.refresh_threats();

        if next.in_check_flag(side) && next.legal_intents(side).is_empty() {
            next.phase = Phase::Ended {
                winner: Some(side.opponent()),
                reason: EndReason::NoLegalResponseToCheck,
            };
        }
        next
    }

    fn draw_to_hand_size(&mut self, side: Side) {
        while self.cards.get(side).hand.len() < HAND_SIZE {
            if self.cards.get(side).deck.is_empty() {
                if self.cards.get(side).discard.is_empty() {
                    break;
                }
                self.reshuffle_discard(side);
            }
            let piles = self.cards.get_mut(side);
            match piles.deck.pop() {
                Some(card) => piles.hand.push(card),
                None => break,
            }
        }
    }

    fn reshuffle_discard(&mut self, side: Side) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.shuffle_seed);
        let piles = self.cards.get_mut(side);
        piles.deck.append(&mut piles.discard);
        piles.deck.shuffle(&mut rng);
        self.shuffle_seed = rng.gen();
    }

    // ========================================================================
    // MUTATION PRIMITIVES (executor only)
    // ========================================================================

    pub(crate) fn refresh_threats(&mut self) {
        self.in_check = BySide::new(
            threat::is_in_check(self, Side::White),
            threat::is_in_check(self, Side::Black),
        );
    }

    fn piece_mut(&mut self, id: PieceId) -> Result<&mut Piece, RulesError> {
        self.pieces
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RulesError::invariant(format!("piece {id} not found")))
    }

    fn active_square(&self, id: PieceId) -> Result<Square, RulesError> {
        self.piece(id)
            .filter(|p| p.is_active())
            .and_then(|p| p.square)
            .ok_or_else(|| RulesError::invariant(format!("{id} is not on the board")))
    }

    /// Put an UNPLACED or CAPTURED piece onto an empty square
    pub(crate) fn place_piece(&mut self, id: PieceId, to: Square) -> Result<(), RulesError> {
        if self.board.contains_key(&to) {
            return Err(RulesError::invariant(format!("place {id}: {to} is occupied")));
        }
        let piece = self.piece_mut(id)?;
        if piece.is_active() {
            return Err(RulesError::invariant(format!("place {id}: already active")));
        }
        piece.lifecycle = Lifecycle::Active;
        piece.square = Some(to);
        self.board.insert(to, id);
        Ok(())
    }

    /// Move an active piece, capturing an enemy occupant.
    /// Returns true when the captured piece was a king.
    pub(crate) fn move_piece(&mut self, id: PieceId, to: Square, allow_capture: bool) -> Result<bool, RulesError> {
        let from = self.active_square(id)?;

        let mut king_captured = false;
        if let Some(&target) = self.board.get(&to) {
            if !allow_capture || target.side == id.side {
                return Err(RulesError::invariant(format!("move {id}: cannot capture on {to}")));
            }
            let captured = self.piece_mut(target)?;
            captured.lifecycle = Lifecycle::Captured;
            captured.square = None;
            king_captured = captured.piece_type == PieceType::King;
        }

        self.board.remove(&from);
        self.board.insert(to, id);
        self.piece_mut(id)?.square = Some(to);
        Ok(king_captured)
    }

    /// Exchange the squares of two active pieces
    pub(crate) fn swap_pieces(&mut self, a: PieceId, b: PieceId) -> Result<(), RulesError> {
        let sq_a = self.active_square(a)?;
        let sq_b = self.active_square(b)?;

        self.board.insert(sq_a, b);
        self.board.insert(sq_b, a);
        self.piece_mut(a)?.square = Some(sq_b);
        self.piece_mut(b)?.square = Some(sq_a);
        Ok(())
    }

    /// Move the played cards from hand to discard, in play order
    pub(crate) fn discard_cards(&mut self, side: Side, card_ids: &[CardId]) {
        let piles = self.cards.get_mut(side);
        for card in card_ids {
            if let Some(idx) = piles.hand.iter().position(|c| c == card) {
                piles.hand.remove(idx);
            }
            piles.discard.push(*card);
        }
    }

    // ========================================================================
    // CONSISTENCY
    // ========================================================================

    /// Check board/piece agreement and card bookkeeping, e.g. after loading a
    /// state from JSON
    pub fn check_consistency(&self) -> Result<(), RulesError> {
        for piece in &self.pieces {
            match (piece.lifecycle, piece.square) {
                (Lifecycle::Active, Some(square)) => {
                    if self.board.get(&square) != Some(&piece.id) {
                        return Err(RulesError::invariant(format!(
                            "{} claims {square} but the board disagrees",
                            piece.id
                        )));
                    }
                }
                (Lifecycle::Active, None) => {
                    return Err(RulesError::invariant(format!("{} is active without a square", piece.id)));
                }
                (_, Some(square)) => {
                    return Err(RulesError::invariant(format!(
                        "{} is not active but sits on {square}",
                        piece.id
                    )));
                }
                (_, None) => {}
            }
        }

        let active = self.pieces.iter().filter(|p| p.is_active()).count();
        if active != self.board.len() {
            return Err(RulesError::invariant(format!(
                "board holds {} pieces, {active} are active",
                self.board.len()
            )));
        }

        for side in Side::BOTH {
            let piles = self.cards.get(side);
            for id in piles.deck.iter().chain(&piles.hand).chain(&piles.discard) {
                match self.card(*id) {
                    Some(card) if card.owner == side => {}
                    _ => return Err(RulesError::invariant(format!("{side} holds foreign card {id}"))),
                }
            }
        }

        if matches!(self.phase, Phase::Turn { .. }) {
            for side in Side::BOTH {
                if !self.piece(PieceId::king(side)).is_some_and(|k| k.is_active()) {
                    return Err(RulesError::invariant(format!("{side} king missing during play")));
                }
            }
        }
        Ok(())
    }
}
