//! Legal destination generation.
//!
//! Each [`PieceKind`] maps to one [`MoveRule`]; [`legal_moves`] dispatches on
//! the rule. Output order is fixed so callers and tests can rely on it:
//!
//! - Pawn: forward step, then the a-side diagonal, then the h-side diagonal.
//! - Knight and King: offset table order.
//! - Sliders: direction table order, each ray walked outward.
//!
//! Whether a move leaves the mover's own king attackable is never
//! considered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::piece::{Color, Piece, PieceId, PieceKind};
use crate::square::Square;
use crate::state::GameState;
use crate::stats::FULL_RAY;

/// A `(file, rank)` step.
pub type Offset = (i8, i8);

/// Knight jumps.
pub const KNIGHT_OFFSETS: [Offset; 8] = [
    (-1, 2),
    (1, 2),
    (-2, 1),
    (2, 1),
    (-2, -1),
    (2, -1),
    (-1, -2),
    (1, -2),
];

/// King steps, swept from the far rank toward the near rank.
pub const KING_OFFSETS: [Offset; 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Diagonal ray directions.
pub const BISHOP_DIRS: [Offset; 4] = [(1, -1), (-1, -1), (1, 1), (-1, 1)];

/// Orthogonal ray directions.
pub const ROOK_DIRS: [Offset; 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

/// Diagonals first, then orthogonals.
pub const QUEEN_DIRS: [Offset; 8] = [
    (1, -1),
    (-1, -1),
    (1, 1),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, 0),
    (-1, 0),
];

/// How a kind moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRule {
    /// Forward step onto empty squares, diagonal-forward attacks only.
    Pawn,
    /// Single jumps to fixed offsets.
    Leap(&'static [Offset]),
    /// Rays along the given directions, stopped by the first occupied square.
    Ray(&'static [Offset]),
}

impl PieceKind {
    /// Movement rule for this kind.
    #[must_use]
    pub const fn move_rule(self) -> MoveRule {
        match self {
            PieceKind::Pawn => MoveRule::Pawn,
            PieceKind::Knight => MoveRule::Leap(&KNIGHT_OFFSETS),
            PieceKind::King => MoveRule::Leap(&KING_OFFSETS),
            PieceKind::Bishop => MoveRule::Ray(&BISHOP_DIRS),
            PieceKind::Rook => MoveRule::Ray(&ROOK_DIRS),
            PieceKind::Queen => MoveRule::Ray(&QUEEN_DIRS),
        }
    }
}

/// A candidate relocation or attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
}

impl Move {
    /// Create a new move.
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = GameError;

    /// Accepts `d2d4` and `d2-d4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|&c| c != '-').collect();
        if compact.len() != 4 || !compact.is_ascii() {
            return Err(GameError::InvalidSquare(s.to_string()));
        }
        let (from, to) = compact.split_at(2);
        Ok(Self::new(from.parse()?, to.parse()?))
    }
}

/// Every legal destination for a piece, as `{from, to}` pairs.
///
/// Returns an empty list when the id is not on the board.
#[must_use]
pub fn legal_moves(state: &GameState, id: PieceId) -> Vec<Move> {
    let (Some(from), Some(piece)) = (state.square_of(id), state.piece(id)) else {
        return Vec::new();
    };

    match piece.kind.move_rule() {
        MoveRule::Pawn => pawn_moves(state, piece, from),
        MoveRule::Leap(offsets) => leap_moves(state, piece, from, offsets),
        MoveRule::Ray(dirs) => ray_moves(state, piece, from, dirs),
    }
}

/// Legal moves of whatever piece stands on `square`.
#[must_use]
pub fn legal_moves_from(state: &GameState, square: Square) -> Vec<Move> {
    state
        .piece_at(square)
        .map(|id| legal_moves(state, id))
        .unwrap_or_default()
}

/// Legal moves of every piece of one side, in piece id order.
#[must_use]
pub fn all_legal_moves(state: &GameState, color: Color) -> Vec<(PieceId, Move)> {
    state
        .pieces()
        .filter(|p| p.color == color)
        .flat_map(|p| legal_moves(state, p.id).into_iter().map(move |m| (p.id, m)))
        .collect()
}

/// Whether `to` is among the piece's legal destinations.
#[must_use]
pub fn is_legal(state: &GameState, id: PieceId, to: Square) -> bool {
    legal_moves(state, id).iter().any(|m| m.to == to)
}

fn is_enemy(state: &GameState, piece: &Piece, square: Square) -> bool {
    state
        .occupant(square)
        .is_some_and(|other| other.color != piece.color)
}

fn pawn_moves(state: &GameState, piece: &Piece, from: Square) -> Vec<Move> {
    let forward = piece.color.forward();
    let mut moves = Vec::with_capacity(3);

    if let Some(ahead) = from.offset(0, forward) {
        if state.piece_at(ahead).is_none() {
            moves.push(Move::new(from, ahead));
        }
    }
    for df in [-1, 1] {
        if let Some(diag) = from.offset(df, forward) {
            if is_enemy(state, piece, diag) {
                moves.push(Move::new(from, diag));
            }
        }
    }
    moves
}

fn leap_moves(state: &GameState, piece: &Piece, from: Square, offsets: &[Offset]) -> Vec<Move> {
    offsets
        .iter()
        .filter_map(|&(df, dr)| from.offset(df, dr))
        .filter(|&to| state.piece_at(to).is_none() || is_enemy(state, piece, to))
        .map(|to| Move::new(from, to))
        .collect()
}

fn ray_moves(state: &GameState, piece: &Piece, from: Square, dirs: &[Offset]) -> Vec<Move> {
    let limit = if piece.move_range == 0 {
        FULL_RAY
    } else {
        piece.move_range
    };
    let mut moves = Vec::new();

    for &(df, dr) in dirs {
        let mut current = from;
        for _ in 0..limit {
            let Some(next) = current.offset(df, dr) else {
                break;
            };
            match state.occupant(next) {
                None => moves.push(Move::new(from, next)),
                Some(blocker) => {
                    if blocker.color != piece.color {
                        moves.push(Move::new(from, next));
                    }
                    break;
                }
            }
            current = next;
        }
    }
    moves
}
