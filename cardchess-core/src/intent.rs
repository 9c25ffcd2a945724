//! Intents: the only unit of state change
//!
//! An intent is plain data. The generator produces them, the validator checks
//! them and the executor applies them; nothing here has behavior beyond
//! inspection and display.

use crate::board::{Side, Square};
use crate::cards::{CardId, CardKind};
use crate::pieces::PieceId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    Setup,
    Turn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayMode {
    Single,
    Combo,
}

/// Cards committed by a turn intent
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub mode: PlayMode,
    pub card_ids: Vec<CardId>,
}

impl Play {
    pub fn single(card: CardId) -> Self {
        Self { mode: PlayMode::Single, card_ids: vec![card] }
    }

    pub fn combo(a: CardId, b: CardId) -> Self {
        Self { mode: PlayMode::Combo, card_ids: vec![a, b] }
    }

    /// Same cards regardless of order
    pub fn same_cards(&self, cards: &[CardId]) -> bool {
        self.card_ids.len() == cards.len() && cards.iter().all(|c| self.card_ids.contains(c))
    }
}

/// One piece moving once
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveStep {
    pub piece_id: PieceId,
    pub from: Square,
    pub to: Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePayload {
    pub piece_id: PieceId,
    pub to: Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPayload {
    pub piece_a: PieceId,
    pub piece_b: PieceId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCheckPayload {
    pub king_from: Square,
    pub king_to: Square,
    /// Omitted only when the king's step captures the enemy king
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followup: Option<MoveStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComboNnPayload {
    /// One knight, two L-moves; a single entry only when it captures the king
    #[serde(rename_all = "camelCase")]
    Double {
        piece_id: PieceId,
        from: Square,
        moves: Vec<Square>,
    },
    /// Two knights, one L-move each
    Split { a: MoveStep, b: MoveStep },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MorphMode {
    /// A knight moves with the partner card's pattern
    KnightAsOther,
    /// A piece of the partner card's type moves like a knight
    OtherAsKnight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorphPayload {
    pub other_kind: CardKind,
    pub mode: MorphMode,
    pub piece_id: PieceId,
    pub from: Square,
    pub to: Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KingPlacement {
    pub to: Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnightPlacement {
    pub left: Square,
    pub right: Square,
}

/// Action with its payload, serialized as `{"type": .., "payload": ..}`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Action {
    #[serde(rename = "SETUP_PLACE_KING")]
    SetupPlaceKing(KingPlacement),
    #[serde(rename = "SETUP_PLACE_KNIGHTS")]
    SetupPlaceKnights(KnightPlacement),
    #[serde(rename = "PLACE")]
    Place(PlacePayload),
    #[serde(rename = "MOVE_STANDARD")]
    MoveStandard(MoveStep),
    #[serde(rename = "NOBLE_KING_ADJ_NO_CAPTURE")]
    NobleKing(MoveStep),
    #[serde(rename = "NOBLE_ROOK_SWAP")]
    NobleRookSwap(SwapPayload),
    #[serde(rename = "NOBLE_QUEEN_MOVE_EXTRA_TURN")]
    NobleQueen(MoveStep),
    #[serde(rename = "NOBLE_BISHOP_RESURRECT")]
    NobleBishopResurrect(PlacePayload),
    #[serde(rename = "NOBLE_BISHOP_BLOCK_CHECK")]
    NobleBishopBlockCheck(BlockCheckPayload),
    #[serde(rename = "COMBO_NN")]
    ComboNn(ComboNnPayload),
    #[serde(rename = "COMBO_NX_MORPH")]
    ComboNxMorph(MorphPayload),
}

/// Payload-free action tag, for selection queries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    SetupPlaceKing,
    SetupPlaceKnights,
    Place,
    MoveStandard,
    #[serde(rename = "NOBLE_KING_ADJ_NO_CAPTURE")]
    NobleKing,
    NobleRookSwap,
    #[serde(rename = "NOBLE_QUEEN_MOVE_EXTRA_TURN")]
    NobleQueen,
    NobleBishopResurrect,
    NobleBishopBlockCheck,
    ComboNn,
    ComboNxMorph,
}

impl ActionType {
    pub fn label(self) -> &'static str {
        match self {
            ActionType::SetupPlaceKing => "Place king",
            ActionType::SetupPlaceKnights => "Place knights",
            ActionType::Place => "Place piece",
            ActionType::MoveStandard => "Standard move",
            ActionType::NobleKing => "King Noble: step to an empty adjacent square",
            ActionType::NobleRookSwap => "Rook Noble: swap two pieces",
            ActionType::NobleQueen => "Queen Noble: standard move + extra turn",
            ActionType::NobleBishopResurrect => "Bishop Noble: resurrect a captured piece",
            ActionType::NobleBishopBlockCheck => "Bishop Noble: king move + standard move",
            ActionType::ComboNn => "Knight+Knight Combo",
            ActionType::ComboNxMorph => "Knight+X Combo",
        }
    }
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::SetupPlaceKing(_) => ActionType::SetupPlaceKing,
            Action::SetupPlaceKnights(_) => ActionType::SetupPlaceKnights,
            Action::Place(_) => ActionType::Place,
            Action::MoveStandard(_) => ActionType::MoveStandard,
            Action::NobleKing(_) => ActionType::NobleKing,
            Action::NobleRookSwap(_) => ActionType::NobleRookSwap,
            Action::NobleQueen(_) => ActionType::NobleQueen,
            Action::NobleBishopResurrect(_) => ActionType::NobleBishopResurrect,
            Action::NobleBishopBlockCheck(_) => ActionType::NobleBishopBlockCheck,
            Action::ComboNn(_) => ActionType::ComboNn,
            Action::ComboNxMorph(_) => ActionType::ComboNxMorph,
        }
    }

    /// Pieces this action moves, places or swaps
    pub fn pieces(&self, side: Side) -> Vec<PieceId> {
        match self {
            Action::SetupPlaceKing(_) | Action::SetupPlaceKnights(_) => vec![PieceId::king(side)],
            Action::Place(p) | Action::NobleBishopResurrect(p) => vec![p.piece_id],
            Action::MoveStandard(m) | Action::NobleKing(m) | Action::NobleQueen(m) => vec![m.piece_id],
            Action::NobleRookSwap(s) => vec![s.piece_a, s.piece_b],
            Action::NobleBishopBlockCheck(b) => {
                let mut ids = vec![PieceId::king(side)];
                ids.extend(b.followup.map(|f| f.piece_id));
                ids
            }
            Action::ComboNn(ComboNnPayload::Double { piece_id, .. }) => vec![*piece_id],
            Action::ComboNn(ComboNnPayload::Split { a, b }) => vec![a.piece_id, b.piece_id],
            Action::ComboNxMorph(m) => vec![m.piece_id],
        }
    }
}

/// A fully specified candidate transition
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intent {
    pub side: Side,
    pub kind: IntentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play: Option<Play>,
    pub action: Action,
}

impl Intent {
    pub fn setup(side: Side, action: Action) -> Self {
        Self { side, kind: IntentKind::Setup, play: None, action }
    }

    pub fn turn(side: Side, play: Play, action: Action) -> Self {
        Self { side, kind: IntentKind::Turn, play: Some(play), action }
    }

    pub fn card_ids(&self) -> &[CardId] {
        self.play.as_ref().map_or(&[], |p| p.card_ids.as_slice())
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.side)?;
        if let Some(play) = &self.play {
            let cards: Vec<String> = play.card_ids.iter().map(|c| c.to_string()).collect();
            write!(f, " played {}", cards.join("+"))?;
        }
        write!(f, " -> ")?;
        match &self.action {
            Action::SetupPlaceKing(k) => write!(f, "king to {}", k.to),
            Action::SetupPlaceKnights(k) => write!(f, "knights to {} and {}", k.left, k.right),
            Action::Place(p) => write!(f, "place {} on {}", p.piece_id, p.to),
            Action::MoveStandard(m) => write!(f, "{} {}-{}", m.piece_id, m.from, m.to),
            Action::NobleKing(m) => write!(f, "king noble: {} {}-{}", m.piece_id, m.from, m.to),
            Action::NobleRookSwap(s) => write!(f, "rook noble: swap {} and {}", s.piece_a, s.piece_b),
            Action::NobleQueen(m) => {
                write!(f, "queen noble: {} {}-{} (extra turn)", m.piece_id, m.from, m.to)
            }
            Action::NobleBishopResurrect(p) => {
                write!(f, "bishop noble: resurrect {} on {}", p.piece_id, p.to)
            }
            Action::NobleBishopBlockCheck(b) => {
                write!(f, "bishop noble: king {}-{}", b.king_from, b.king_to)?;
                if let Some(step) = b.followup {
                    write!(f, ", then {} {}-{}", step.piece_id, step.from, step.to)?;
                }
                Ok(())
            }
            Action::ComboNn(ComboNnPayload::Double { piece_id, from, moves }) => {
                write!(f, "double knight: {piece_id} {from}")?;
                for to in moves {
                    write!(f, "-{to}")?;
                }
                Ok(())
            }
            Action::ComboNn(ComboNnPayload::Split { a, b }) => write!(
                f,
                "split knights: {} {}-{}, {} {}-{}",
                a.piece_id, a.from, a.to, b.piece_id, b.from, b.to
            ),
            Action::ComboNxMorph(m) => {
                let how = match m.mode {
                    MorphMode::KnightAsOther => format!("as {}", m.other_kind.name()),
                    MorphMode::OtherAsKnight => "as Knight".to_string(),
                };
                write!(f, "morph: {} {}-{} {}", m.piece_id, m.from, m.to, how)
            }
        }
    }
}
