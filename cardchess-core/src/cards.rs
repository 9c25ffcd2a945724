//! Card instances, deck composition and per-side card piles

use crate::board::Side;
use crate::pieces::PieceType;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Cards held in hand after a draw step
pub const HAND_SIZE: usize = 8;

/// Cards per side
pub const DECK_SIZE: usize = 32;

/// Card kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl CardKind {
    /// Piece type the card refers to (for placement and morphing)
    pub fn piece_type(self) -> PieceType {
        match self {
            CardKind::Pawn => PieceType::Pawn,
            CardKind::Knight => PieceType::Knight,
            CardKind::Bishop => PieceType::Bishop,
            CardKind::Rook => PieceType::Rook,
            CardKind::Queen => PieceType::Queen,
            CardKind::King => PieceType::King,
        }
    }

    /// Court kinds that can partner a knight in a morph combo
    pub fn is_noble(self) -> bool {
        matches!(self, CardKind::King | CardKind::Rook | CardKind::Queen | CardKind::Bishop)
    }

    pub fn name(self) -> &'static str {
        self.piece_type().name()
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-side deck composition: (kind, count)
pub const DECK_COMPOSITION: [(CardKind, usize); 6] = [
    (CardKind::Knight, 16),
    (CardKind::Pawn, 8),
    (CardKind::King, 5),
    (CardKind::Rook, 1),
    (CardKind::Queen, 1),
    (CardKind::Bishop, 1),
];

/// Card identifier, written `c_0001`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u16);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c_{:04}", self.0)
    }
}

impl FromStr for CardId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("c_")
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|n| n.parse::<u16>().ok())
            .map(CardId)
            .ok_or_else(|| format!("bad card id: {s}"))
    }
}

impl Serialize for CardId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CardId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable card instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub owner: Side,
    pub kind: CardKind,
}

/// Ordered card locations of one side; the deck top is its last element
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPiles {
    pub deck: Vec<CardId>,
    pub hand: Vec<CardId>,
    pub discard: Vec<CardId>,
}

impl CardPiles {
    /// Cards this side could still draw
    pub fn available(&self) -> usize {
        self.deck.len() + self.discard.len()
    }
}

/// Build all 64 card instances: White `c_0001..c_0032`, Black `c_0033..c_0064`
pub fn build_card_instances() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE * 2);
    let mut next_id = 1u16;
    for owner in Side::BOTH {
        for &(kind, count) in &DECK_COMPOSITION {
            for _ in 0..count {
                cards.push(Card { id: CardId(next_id), owner, kind });
                next_id += 1;
            }
        }
    }
    cards
}
