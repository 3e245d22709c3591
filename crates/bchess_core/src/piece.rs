//! Sides, piece kinds, and piece identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::stats::PieceStats;

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Moves first, starts on ranks 1 and 2.
    White,
    /// Starts on ranks 7 and 8.
    Black,
}

impl Color {
    /// Both sides in setup order.
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Single-letter code used in piece ids and display codes.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    /// Capitalized side name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
        }
    }

    /// Rank step a pawn of this side takes when moving forward.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Zero-based rank of this side's back row.
    #[must_use]
    pub const fn back_rank(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    /// Zero-based rank of this side's pawn row.
    #[must_use]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Self::White => 1,
            Self::Black => 6,
        }
    }

    fn from_code(code: char) -> Option<Self> {
        match code {
            'w' => Some(Self::White),
            'b' => Some(Self::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Piece archetype. Determines base stats and the movement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    /// Steps one square in any direction. Its defeat ends the game.
    King,
    /// Slides along ranks, files, and diagonals.
    Queen,
    /// Slides along ranks and files.
    Rook,
    /// Slides along diagonals.
    Bishop,
    /// Jumps in an L shape.
    Knight,
    /// Steps forward onto empty squares, attacks diagonally forward.
    Pawn,
}

impl PieceKind {
    /// Every kind, in stat-inspector order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
    ];

    /// Back-rank arrangement from the a-file to the h-file.
    pub const BACK_RANK: [PieceKind; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    /// Single-letter code (`K`, `Q`, `R`, `B`, `N`, `P`).
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::King => 'K',
            Self::Queen => 'Q',
            Self::Rook => 'R',
            Self::Bishop => 'B',
            Self::Knight => 'N',
            Self::Pawn => 'P',
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::King => "King",
            Self::Queen => "Queen",
            Self::Rook => "Rook",
            Self::Bishop => "Bishop",
            Self::Knight => "Knight",
            Self::Pawn => "Pawn",
        }
    }

    /// Whether this kind moves along rays.
    #[must_use]
    pub const fn is_slider(self) -> bool {
        matches!(self, Self::Queen | Self::Rook | Self::Bishop)
    }

    /// Parse a kind from its single-letter code.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable identifier for one piece, e.g. `wR#2` for the second white rook.
///
/// The sequence number counts per (color, kind) in placement order, so ids
/// are never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PieceId {
    /// Owning side.
    pub color: Color,
    /// Piece kind.
    pub kind: PieceKind,
    /// One-based sequence number within (color, kind).
    pub seq: u16,
}

impl PieceId {
    /// Create a new piece id.
    #[must_use]
    pub const fn new(color: Color, kind: PieceKind, seq: u16) -> Self {
        Self { color, kind, seq }
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}#{}", self.color.code(), self.kind.code(), self.seq)
    }
}

impl FromStr for PieceId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidPieceId(s.to_string());
        let mut chars = s.chars();
        let color = chars.next().and_then(Color::from_code).ok_or_else(invalid)?;
        let kind = chars.next().and_then(PieceKind::from_code).ok_or_else(invalid)?;
        if chars.next() != Some('#') {
            return Err(invalid());
        }
        let seq: u16 = chars.as_str().parse().map_err(|_| invalid())?;
        if seq == 0 {
            return Err(invalid());
        }
        Ok(Self { color, kind, seq })
    }
}

impl TryFrom<String> for PieceId {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PieceId> for String {
    fn from(id: PieceId) -> Self {
        id.to_string()
    }
}

/// One unit on the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// Stable identifier.
    pub id: PieceId,
    /// Owning side.
    pub color: Color,
    /// Piece kind.
    pub kind: PieceKind,
    /// Remaining hit points. Positive while the piece is registered.
    pub hp: u32,
    /// Attack value.
    pub atk: u32,
    /// Defense value, subtracted from incoming attack.
    pub def: u32,
    /// Maximum ray length for sliding kinds; 0 for kinds with a fixed rule.
    #[serde(rename = "move")]
    pub move_range: u8,
}

impl Piece {
    /// Create a piece at full strength from a stat line.
    #[must_use]
    pub const fn new(id: PieceId, stats: PieceStats) -> Self {
        Self {
            id,
            color: id.color,
            kind: id.kind,
            hp: stats.hp,
            atk: stats.atk,
            def: stats.def,
            move_range: stats.move_range,
        }
    }

    /// Compact color+kind code used by board renderers (`wK`, `bP`).
    #[must_use]
    pub fn code(&self) -> String {
        format!("{}{}", self.color.code(), self.kind.code())
    }

    /// Human-readable "White Rook" style description.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", self.color.display_name(), self.kind.name())
    }
}
