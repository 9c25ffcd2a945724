//! Intent execution: the state transition function

use crate::board::{Side, Square};
use crate::error::{Illegal, RulesError};
use crate::intent::{Action, ComboNnPayload, Intent, IntentKind};
use crate::pieces::{PieceId, PieceType};
use crate::state::{EndReason, GameState, LogEntry, Phase, SetupStep, TurnStep};
use crate::validate::{flanks, validate_intent};

impl GameState {
    /// Validate and apply an intent, returning the next state.
    ///
    /// `self` is never modified; on error the caller keeps the current state.
    pub fn apply_intent(&self, intent: &Intent) -> Result<GameState, RulesError> {
        validate_intent(self, intent)?;

        let mut next = self.clone();
        match intent.kind {
            IntentKind::Setup => next.apply_setup(intent)?,
            IntentKind::Turn => next.apply_turn(intent)?,
        }
        next.log.push(LogEntry::new(intent));
        Ok(next)
    }

    /// Discard, act, reject self-check, then hand over the turn
    fn apply_turn(&mut self, intent: &Intent) -> Result<(), RulesError> {
        let side = intent.side;
        self.discard_cards(side, intent.card_ids());

        if self.apply_action(side, &intent.action)? {
            self.phase = Phase::Ended {
                winner: Some(side),
                reason: EndReason::KingCaptured,
            };
            return Ok(());
        }

        self.refresh_threats();
        if self.in_check_flag(side) {
            return Err(Illegal::LeavesKingInCheck(side).into());
        }

        let Phase::Turn { extra_turn_queue, .. } = self.phase else {
            return Err(RulesError::invariant("turn intent applied outside the turn phase"));
        };
        let mut queue = extra_turn_queue;
        if matches!(intent.action, Action::NobleQueen(_)) {
            queue += 1;
        }
        self.phase = if queue > 0 {
            Phase::Turn { side, step: TurnStep::Draw, extra_turn_queue: queue - 1 }
        } else {
            Phase::Turn { side: side.opponent(), step: TurnStep::Draw, extra_turn_queue: 0 }
        };
        Ok(())
    }

    // ========================================================================
    // SETUP
    // ========================================================================

    fn apply_setup(&mut self, intent: &Intent) -> Result<(), RulesError> {
        let side = intent.side;
        match &intent.action {
            Action::SetupPlaceKing(king) => {
                self.place_piece(PieceId::king(side), king.to)?;
                if self.config.auto_place_knights {
                    let (left, right) = flanks(king.to)
                        .ok_or_else(|| RulesError::invariant(format!("no flanks around {}", king.to)))?;
                    self.place_knights(side, left, right)?;
                    self.finish_setup(side);
                } else {
                    self.phase = Phase::Setup { side_to_place: side, step: SetupStep::PlaceKnights };
                }
            }
            Action::SetupPlaceKnights(knights) => {
                self.place_knights(side, knights.left, knights.right)?;
                self.finish_setup(side);
            }
            other => {
                return Err(RulesError::invariant(format!(
                    "{} is not a setup action",
                    other.action_type().label()
                )))
            }
        }
        self.refresh_threats();
        Ok(())
    }

    fn place_knights(&mut self, side: Side, left: Square, right: Square) -> Result<(), RulesError> {
        self.place_piece(PieceId::new(side, PieceType::Knight, 1), left)?;
        self.place_piece(PieceId::new(side, PieceType::Knight, 2), right)
    }

    /// White done -> Black places; Black done -> White's first draw
    fn finish_setup(&mut self, side: Side) {
        self.phase = match side {
            Side::White => Phase::Setup { side_to_place: Side::Black, step: SetupStep::PlaceKing },
            Side::Black => Phase::Turn { side: Side::White, step: TurnStep::Draw, extra_turn_queue: 0 },
        };
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Apply a validated turn action. Returns true when a king was captured.
    fn apply_action(&mut self, side: Side, action: &Action) -> Result<bool, RulesError> {
        match action {
            Action::Place(p) | Action::NobleBishopResurrect(p) => {
                self.place_piece(p.piece_id, p.to)?;
                Ok(false)
            }
            Action::MoveStandard(step) | Action::NobleQueen(step) => self.move_piece(step.piece_id, step.to, true),
            Action::NobleKing(step) => self.move_piece(step.piece_id, step.to, false),
            Action::NobleRookSwap(swap) => {
                self.swap_pieces(swap.piece_a, swap.piece_b)?;
                Ok(false)
            }
            Action::NobleBishopBlockCheck(block) => {
                if self.move_piece(PieceId::king(side), block.king_to, true)? {
                    return Ok(true);
                }
                match block.followup {
                    Some(step) => self.move_piece(step.piece_id, step.to, true),
                    None => Err(RulesError::invariant("block check without a follow-up")),
                }
            }
            Action::ComboNn(ComboNnPayload::Double { piece_id, moves, .. }) => {
                for &to in moves {
                    if self.move_piece(*piece_id, to, true)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Action::ComboNn(ComboNnPayload::Split { a, b }) => {
                if self.move_piece(a.piece_id, a.to, true)? {
                    return Ok(true);
                }
                self.move_piece(b.piece_id, b.to, true)
            }
            Action::ComboNxMorph(m) => self.move_piece(m.piece_id, m.to, true),
            Action::SetupPlaceKing(_) | Action::SetupPlaceKnights(_) => {
                Err(RulesError::invariant("setup action during a turn"))
            }
        }
    }
}
