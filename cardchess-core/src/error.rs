//! Rules engine errors

use crate::board::{Side, Square};
use crate::cards::{CardId, CardKind};
use crate::pieces::{Lifecycle, PieceId};
use thiserror::Error;

/// Failure of `validate_intent` / `apply_intent`
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RulesError {
    /// Player error; the input state stays authoritative
    #[error("illegal intent: {0}")]
    IllegalIntent(#[from] Illegal),

    /// Engine bug or corrupted state
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl RulesError {
    pub fn is_illegal(&self) -> bool {
        matches!(self, RulesError::IllegalIntent(_))
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        RulesError::InvariantViolation(msg.into())
    }
}

/// Why an intent was rejected
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Illegal {
    #[error("the game is over")]
    GameOver,
    #[error("setup intents are only accepted during setup")]
    NotInSetup,
    #[error("turn intents are not accepted during setup")]
    SetupInProgress,
    #[error("it is {expected}'s turn")]
    WrongSide { expected: Side },
    #[error("the turn is waiting for its draw step")]
    AwaitingDraw,
    #[error("expected a {expected} action during setup")]
    WrongSetupStep { expected: &'static str },
    #[error("king must be placed on the back rank")]
    KingNotOnBackRank,
    #[error("king cannot be placed in a corner")]
    KingInCorner,
    #[error("knights must flank the king on {left} and {right}")]
    KnightsNotFlanking { left: Square, right: Square },
    #[error("square {0} is occupied")]
    Occupied(Square),
    #[error("a turn intent must play cards")]
    MissingPlay,
    #[error("play 1 card, or 2 cards as a combo")]
    BadCardCount,
    #[error("card {0} is played twice")]
    DuplicateCard(CardId),
    #[error("card {0} is not in hand")]
    CardNotInHand(CardId),
    #[error("card {0} does not belong to {1}")]
    NotYourCard(CardId, Side),
    #[error("pawn cards cannot be used in combos")]
    PawnInCombo,
    #[error("a combo must include a knight")]
    ComboWithoutKnight,
    #[error("{0} cannot partner a knight in a combo")]
    BadComboPartner(CardKind),
    #[error("the played cards do not grant this action")]
    NotGrantedByCards,
    #[error("unknown piece {0}")]
    UnknownPiece(PieceId),
    #[error("piece {0} does not belong to {1}")]
    NotYourPiece(PieceId, Side),
    #[error("piece {piece} is {actual:?}, expected {expected:?}")]
    WrongLifecycle { piece: PieceId, expected: Lifecycle, actual: Lifecycle },
    #[error("piece {piece} is not on {from}")]
    FromMismatch { piece: PieceId, from: Square },
    #[error("piece {0} cannot be used for this action")]
    WrongPieceType(PieceId),
    #[error("kings cannot be placed or resurrected")]
    KingNotPlaceable,
    #[error("{piece} cannot enter the board on {to}")]
    WrongEntryRank { piece: PieceId, to: Square },
    #[error("{piece} cannot reach {to}")]
    UnreachableSquare { piece: PieceId, to: Square },
    #[error("{0} is not an empty adjacent square")]
    NotAdjacentEmpty(Square),
    #[error("a piece cannot swap with itself")]
    SwapWithSelf,
    #[error("block check is only available while in check")]
    NotInCheck,
    #[error("a follow-up move is required")]
    MissingFollowup,
    #[error("a double knight move needs two steps")]
    MissingSecondStep,
    #[error("a double knight move has at most two steps")]
    TooManySteps,
    #[error("split moves need two different knights and destinations")]
    SplitOverlap,
    #[error("the move leaves {0}'s king in check")]
    LeavesKingInCheck(Side),
}
