//! Board geometry: squares, sides and the occupancy map

use crate::pieces::PieceId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Board width and height
pub const BOARD_SIZE: i8 = 8;

/// File letters, index 0 = 'a'
pub const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// Occupancy: square -> id of the ACTIVE piece standing on it
pub type Board = FxHashMap<Square, PieceId>;

// ============================================================================
// SIDE
// ============================================================================

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "B")]
    Black,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::White, Side::Black];

    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Rank index (0-based) of this side's back rank
    pub fn back_rank(self) -> i8 {
        match self {
            Side::White => 0,
            Side::Black => BOARD_SIZE - 1,
        }
    }

    /// Rank index (0-based) where this side's pawns start
    pub fn pawn_rank(self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => BOARD_SIZE - 2,
        }
    }

    /// Rank delta of a forward pawn step
    pub fn forward(self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    pub fn tag(self) -> char {
        match self {
            Side::White => 'W',
            Side::Black => 'B',
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'W' => Some(Side::White),
            'B' => Some(Side::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next().and_then(Side::from_tag), chars.next()) {
            (Some(side), None) => Ok(side),
            _ => Err(format!("unknown side: {s}")),
        }
    }
}

/// A value held once per side, serialized as `{"W": .., "B": ..}`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BySide<T> {
    #[serde(rename = "W")]
    pub white: T,
    #[serde(rename = "B")]
    pub black: T,
}

impl<T> BySide<T> {
    pub fn new(white: T, black: T) -> Self {
        Self { white, black }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }
}

// ============================================================================
// SQUARE
// ============================================================================

/// A board square; file and rank are 0-based (`a1` = (0, 0)).
/// Ordered rank-major, a1 < b1 < ... < h8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    rank: i8,
    file: i8,
}

impl Square {
    /// Build a square, `None` when off the board
    pub const fn new(file: i8, rank: i8) -> Option<Self> {
        if file >= 0 && file < BOARD_SIZE && rank >= 0 && rank < BOARD_SIZE {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    pub fn file(&self) -> i8 {
        self.file
    }

    pub fn rank(&self) -> i8 {
        self.rank
    }

    /// Square shifted by (df, dr), `None` when it leaves the board
    pub fn offset(&self, df: i8, dr: i8) -> Option<Square> {
        Square::new(self.file + df, self.rank + dr)
    }

    /// King-step adjacency (distinct squares only)
    pub fn is_adjacent(&self, other: Square) -> bool {
        let df = (self.file - other.file).abs();
        let dr = (self.rank - other.rank).abs();
        df <= 1 && dr <= 1 && df + dr > 0
    }

    pub fn is_corner(&self) -> bool {
        (self.file == 0 || self.file == BOARD_SIZE - 1)
            && (self.rank == 0 || self.rank == BOARD_SIZE - 1)
    }

    /// All 64 squares, rank by rank from a1
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Square { file, rank }))
    }

    /// The 8 squares of one rank, a-file first
    pub fn rank_squares(rank: i8) -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).filter_map(move |file| Square::new(file, rank))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", FILES[self.file as usize], self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(format!("bad square: {s}"));
        }
        let file = bytes[0].wrapping_sub(b'a') as i8;
        let rank = bytes[1].wrapping_sub(b'1') as i8;
        Square::new(file, rank).ok_or_else(|| format!("bad square: {s}"))
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Shorthand for tests and fixtures; panics on a malformed square
#[cfg(test)]
pub(crate) fn sq(s: &str) -> Square {
    s.parse().unwrap()
}
