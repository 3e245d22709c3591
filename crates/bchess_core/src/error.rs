//! Error types for the game engine.

use thiserror::Error;

use crate::piece::{Color, PieceId};
use crate::square::Square;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all engine and match errors.
///
/// The board-level helpers report absence with `Option` or an empty move
/// list; these variants are raised by the layers that validate caller input
/// (parsing, the match controller, data and replay loading).
#[derive(Debug, Error)]
pub enum GameError {
    /// No live piece carries this identifier.
    #[error("Piece not found: {0}")]
    PieceNotFound(PieceId),

    /// Text could not be parsed as a square.
    #[error("Invalid square: {0:?}")]
    InvalidSquare(String),

    /// Text could not be parsed as a piece identifier.
    #[error("Invalid piece ID: {0:?}")]
    InvalidPieceId(String),

    /// No piece stands on the square.
    #[error("No piece on {0}")]
    EmptySquare(Square),

    /// The destination is not in the piece's legal move set.
    #[error("Illegal move for {piece}: {from} to {to}")]
    IllegalMove {
        /// Piece that attempted the move.
        piece: PieceId,
        /// Origin square.
        from: Square,
        /// Rejected destination.
        to: Square,
    },

    /// The piece does not belong to the side to move.
    #[error("{piece} cannot move on {turn}'s turn")]
    WrongSide {
        /// Piece that was selected.
        piece: PieceId,
        /// Side whose turn it is.
        turn: Color,
    },

    /// The match has already ended.
    #[error("Game is over")]
    GameOver,

    /// A move was attempted without a selected piece.
    #[error("No piece selected")]
    NoSelection,

    /// Data file parsing error.
    #[error("Failed to parse data from '{source_name}': {message}")]
    DataParseError {
        /// Name of the file or buffer that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
