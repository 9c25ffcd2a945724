//! Piece definitions and the fixed per-side inventory

use crate::board::{Side, Square};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Piece type, serialized as its single-letter tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceType {
    #[serde(rename = "P")]
    Pawn,
    #[serde(rename = "N")]
    Knight,
    #[serde(rename = "B")]
    Bishop,
    #[serde(rename = "R")]
    Rook,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl PieceType {
    pub fn letter(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceType::Pawn => "Pawn",
            PieceType::Knight => "Knight",
            PieceType::Bishop => "Bishop",
            PieceType::Rook => "Rook",
            PieceType::Queen => "Queen",
            PieceType::King => "King",
        }
    }

    /// Rank index where a piece of this type enters the board for `side`
    pub fn entry_rank(self, side: Side) -> i8 {
        match self {
            PieceType::Pawn => side.pawn_rank(),
            _ => side.back_rank(),
        }
    }
}

/// Three-state piece lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifecycle {
    Unplaced,
    Active,
    Captured,
}

/// Stable piece identifier, written `W_K`, `W_Q`, `B_N2`, `W_P5`
///
/// The owning side and the type are part of the id, so a board snapshot
/// (square -> id) is enough to compute movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId {
    pub side: Side,
    pub piece_type: PieceType,
    /// 0 for the unique pieces (king, queen), 1.. otherwise
    pub ordinal: u8,
}

impl PieceId {
    pub const fn new(side: Side, piece_type: PieceType, ordinal: u8) -> Self {
        Self { side, piece_type, ordinal }
    }

    pub const fn king(side: Side) -> Self {
        Self::new(side, PieceType::King, 0)
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.side.tag(), self.piece_type.letter())?;
        if self.ordinal > 0 {
            write!(f, "{}", self.ordinal)?;
        }
        Ok(())
    }
}

impl FromStr for PieceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("bad piece id: {s}");
        let mut chars = s.chars();
        let side = chars.next().and_then(Side::from_tag).ok_or_else(bad)?;
        if chars.next() != Some('_') {
            return Err(bad());
        }
        let piece_type = chars.next().and_then(PieceType::from_letter).ok_or_else(bad)?;
        let rest = chars.as_str();
        let ordinal = if rest.is_empty() {
            0
        } else {
            rest.parse::<u8>().map_err(|_| bad())?
        };
        Ok(PieceId::new(side, piece_type, ordinal))
    }
}

impl Serialize for PieceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A piece record; captured pieces are kept for resurrection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: PieceId,
    pub side: Side,
    #[serde(rename = "type")]
    pub piece_type: PieceType,
    pub lifecycle: Lifecycle,
    pub square: Option<Square>,
}

impl Piece {
    fn unplaced(id: PieceId) -> Self {
        Self {
            id,
            side: id.side,
            piece_type: id.piece_type,
            lifecycle: Lifecycle::Unplaced,
            square: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }
}

/// Court and pawn inventory of one side: (type, count)
pub const INVENTORY: [(PieceType, u8); 6] = [
    (PieceType::King, 1),
    (PieceType::Queen, 1),
    (PieceType::Rook, 2),
    (PieceType::Bishop, 2),
    (PieceType::Knight, 2),
    (PieceType::Pawn, 8),
];

/// All 32 pieces, UNPLACED, White first, in inventory order
pub fn initial_pieces() -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(32);
    for side in Side::BOTH {
        for &(piece_type, count) in &INVENTORY {
            if count == 1 {
                pieces.push(Piece::unplaced(PieceId::new(side, piece_type, 0)));
            } else {
                for ordinal in 1..=count {
                    pieces.push(Piece::unplaced(PieceId::new(side, piece_type, ordinal)));
                }
            }
        }
    }
    pieces
}
