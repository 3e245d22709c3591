//! Board coordinates.
//!
//! A [`Square`] is one of the 64 cells addressed by file `a`-`h` and rank
//! `1`-`8`. Squares serialize as their algebraic text (`"e4"`) so state dumps
//! and protocol messages stay readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Number of files (and ranks) on the board.
pub const BOARD_SIZE: u8 = 8;

const FILE_CHARS: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// A board square.
///
/// Ordering is rank-major (`a1 < b1 < ... < h1 < a2`), which is the order
/// [`Square::all`] yields and the order sorted maps iterate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    // Field order drives the derived `Ord`.
    rank: u8,
    file: u8,
}

impl Square {
    /// Create a square from zero-based file and rank indices.
    ///
    /// Returns `None` when either index is off the board.
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < BOARD_SIZE && rank < BOARD_SIZE {
            Some(Self { rank, file })
        } else {
            None
        }
    }

    /// Zero-based file index (`a` = 0).
    #[must_use]
    pub const fn file(self) -> u8 {
        self.file
    }

    /// Zero-based rank index (rank `1` = 0).
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// File letter, `'a'` through `'h'`.
    #[must_use]
    pub const fn file_char(self) -> char {
        FILE_CHARS[self.file as usize]
    }

    /// The square `df` files and `dr` ranks away, if it is on the board.
    #[must_use]
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let file = i16::from(self.file) + i16::from(df);
        let rank = i16::from(self.rank) + i16::from(dr);
        let file = u8::try_from(file).ok()?;
        let rank = u8::try_from(rank).ok()?;
        Self::new(file, rank)
    }

    /// All 64 squares in rank-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Self { rank, file }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidSquare(s.to_string());
        let mut chars = s.chars();
        let (Some(file_char), Some(rank_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(invalid());
        };
        let file = FILE_CHARS
            .iter()
            .position(|&c| c == file_char.to_ascii_lowercase())
            .ok_or_else(invalid)?;
        let rank = rank_char
            .to_digit(10)
            .filter(|r| (1..=8).contains(r))
            .ok_or_else(invalid)?;
        // Both indices were range-checked above.
        Self::new(file as u8, (rank - 1) as u8).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Square {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let sq: Square = "e4".parse().unwrap();
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 3);
        assert_eq!(sq.to_string(), "e4");

        assert_eq!("A1".parse::<Square>().unwrap().to_string(), "a1");
        assert_eq!("h8".parse::<Square>().unwrap(), Square::new(7, 7).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "e", "e9", "i1", "e0", "e44", "4e"] {
            assert!(
                matches!(bad.parse::<Square>(), Err(GameError::InvalidSquare(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_offset_stays_on_board() {
        let a1: Square = "a1".parse().unwrap();
        assert_eq!(a1.offset(1, 2).unwrap().to_string(), "b3");
        assert!(a1.offset(-1, 0).is_none());
        assert!(a1.offset(0, -1).is_none());

        let h8: Square = "h8".parse().unwrap();
        assert!(h8.offset(1, 0).is_none());
        assert!(h8.offset(0, 1).is_none());
        assert_eq!(h8.offset(-7, -7).unwrap().to_string(), "a1");
    }

    #[test]
    fn test_all_is_rank_major() {
        let all: Vec<Square> = Square::all().collect();
        assert_eq!(all.len(), 64);
        assert_eq!(all[0].to_string(), "a1");
        assert_eq!(all[1].to_string(), "b1");
        assert_eq!(all[8].to_string(), "a2");
        assert_eq!(all[63].to_string(), "h8");
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_serde_as_text() {
        let sq: Square = "c7".parse().unwrap();
        let ron_text = ron::to_string(&sq).unwrap();
        assert_eq!(ron_text, "\"c7\"");
        let back: Square = ron::from_str(&ron_text).unwrap();
        assert_eq!(back, sq);
        assert!(ron::from_str::<Square>("\"z9\"").is_err());
    }
}
