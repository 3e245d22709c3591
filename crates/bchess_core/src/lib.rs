//! # Battle Chess Core
//!
//! Game engine for a chess variant where captures are fought out with hit
//! points: an attack deals `max(1, atk - def)` damage and only a defeated
//! defender leaves the board.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No stdin/stdout
//! - No randomness
//!
//! Presentation layers (the headless runner, a board UI) call into the engine
//! and read its outputs; the engine never holds global state beyond the
//! [`GameState`](state::GameState) value it is handed.
//!
//! ## Crate Structure
//!
//! - [`square`] - Board coordinates
//! - [`piece`] - Colors, piece kinds, piece identifiers
//! - [`stats`] - Per-kind hp/atk/def/move table, loadable from RON
//! - [`state`] - Game state store, setup, and query helpers
//! - [`movegen`] - Legal destination generation per piece kind
//! - [`combat`] - Damage calculation and move/attack resolution
//! - [`session`] - Match controller: selection, turns, log, win detection
//! - [`replay`] - Recorded matches and deterministic playback

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod error;
pub mod movegen;
pub mod piece;
pub mod replay;
pub mod session;
pub mod square;
pub mod state;
pub mod stats;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{calculate_damage, resolve_combat, CombatOutcome, MIN_DAMAGE};
    pub use crate::error::{GameError, Result};
    pub use crate::movegen::{legal_moves, Move};
    pub use crate::piece::{Color, Piece, PieceId, PieceKind};
    pub use crate::replay::{Replay, ReplayPlayer, REPLAY_VERSION};
    pub use crate::session::{Match, TurnReport, LOG_CAPACITY};
    pub use crate::square::Square;
    pub use crate::state::{
        clone_state, create_initial_state, create_initial_state_with, describe_piece,
        find_piece_at, find_square, move_piece, to_display_position, GameState,
    };
    pub use crate::stats::{PieceStats, StatTable};
}
