//! Game state store, initial setup, and query helpers.
//!
//! [`GameState`] owns three indices that must always agree:
//!
//! - **positions**: square -> piece id (occupied squares only)
//! - **locations**: piece id -> square (inverse of positions)
//! - **pieces**: piece id -> [`Piece`] (the registry)
//!
//! The indices are private. All board mutation goes through
//! [`GameState::relocate`] and [`GameState::remove_piece`], which keep the
//! three maps in lockstep. Sorted maps give deterministic iteration, hashing,
//! and serialization.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::piece::{Color, Piece, PieceId, PieceKind};
use crate::square::{Square, BOARD_SIZE};
use crate::stats::{PieceStats, StatTable};

/// Number of log entries kept; older entries are dropped first.
pub const LOG_CAPACITY: usize = 40;

/// Complete state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    positions: BTreeMap<Square, PieceId>,
    locations: BTreeMap<PieceId, Square>,
    pieces: BTreeMap<PieceId, Piece>,
    /// Last sequence number handed out per (color, kind).
    spawned: BTreeMap<(Color, PieceKind), u16>,
    /// Stat table new pieces are created from.
    stats: StatTable,
    /// Side to move.
    pub turn: Color,
    /// Piece the UI has picked up, if any.
    pub selected: Option<PieceId>,
    /// Board orientation: `true` draws Black at the bottom.
    pub flipped: bool,
    /// Set once a king has been defeated.
    pub over: bool,
    /// Side that defeated the opposing king.
    pub winner: Option<Color>,
    /// Ending message, e.g. "White wins (king defeated)".
    pub status: Option<String>,
    log: Vec<String>,
}

impl GameState {
    /// Create an empty board with White to move, using the canonical stats.
    #[must_use]
    pub fn empty() -> Self {
        Self::empty_with(StatTable::default())
    }

    /// Create an empty board using a custom stat table.
    #[must_use]
    pub fn empty_with(stats: StatTable) -> Self {
        Self {
            positions: BTreeMap::new(),
            locations: BTreeMap::new(),
            pieces: BTreeMap::new(),
            spawned: BTreeMap::new(),
            stats,
            turn: Color::White,
            selected: None,
            flipped: false,
            over: false,
            winner: None,
            status: None,
            log: Vec::new(),
        }
    }

    /// The stat table pieces are spawned from.
    #[must_use]
    pub const fn stats(&self) -> &StatTable {
        &self.stats
    }

    /// Place a new piece on an empty square with its kind's table stats.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the square is occupied.
    pub fn spawn(&mut self, color: Color, kind: PieceKind, square: Square) -> Result<PieceId> {
        let stats = self.stats.get(kind);
        self.spawn_with(color, kind, square, stats)
    }

    /// Place a new piece on an empty square with explicit stats.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the square is occupied or the
    /// stats carry zero hp.
    pub fn spawn_with(
        &mut self,
        color: Color,
        kind: PieceKind,
        square: Square,
        stats: PieceStats,
    ) -> Result<PieceId> {
        if let Some(occupant) = self.positions.get(&square) {
            return Err(GameError::InvalidState(format!(
                "Cannot spawn on {square}: occupied by {occupant}"
            )));
        }
        if stats.hp == 0 {
            return Err(GameError::InvalidState(format!(
                "Cannot spawn {} {kind} with 0 hp",
                color.display_name()
            )));
        }
        Ok(self.insert_piece(color, kind, square, stats))
    }

    /// Register a piece on a square known to be empty.
    fn insert_piece(
        &mut self,
        color: Color,
        kind: PieceKind,
        square: Square,
        stats: PieceStats,
    ) -> PieceId {
        let seq = self.spawned.entry((color, kind)).or_insert(0);
        *seq += 1;
        let id = PieceId::new(color, kind, *seq);

        self.positions.insert(square, id);
        self.locations.insert(id, square);
        self.pieces.insert(id, Piece::new(id, stats));
        self.check_consistency();
        id
    }

    /// Current square of a live piece.
    #[must_use]
    pub fn square_of(&self, id: PieceId) -> Option<Square> {
        self.locations.get(&id).copied()
    }

    /// Piece id occupying a square.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        self.positions.get(&square).copied()
    }

    /// Look up a live piece.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// Mutable access for combat; board indices stay untouched.
    pub(crate) fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(&id)
    }

    /// Live piece on a square.
    #[must_use]
    pub fn occupant(&self, square: Square) -> Option<&Piece> {
        self.piece_at(square).and_then(|id| self.pieces.get(&id))
    }

    /// Number of live pieces.
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Iterate live pieces in id order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    /// Iterate occupied squares with their piece ids, in square order.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, PieceId)> + '_ {
        self.positions.iter().map(|(&sq, &id)| (sq, id))
    }

    /// Move a piece to `to`, keeping both board indices in sync.
    ///
    /// This is the low-level relocation primitive: it does not check
    /// movement rules or whose turn it is. If `to` holds a different piece,
    /// that piece is taken off the board and out of the registry so the
    /// indices never disagree.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PieceNotFound`] if `id` is not a live piece.
    pub fn relocate(&mut self, id: PieceId, to: Square) -> Result<()> {
        let from = self.square_of(id).ok_or(GameError::PieceNotFound(id))?;
        if from == to {
            return Ok(());
        }

        if let Some(occupant) = self.piece_at(to) {
            tracing::warn!(piece = %id, evicted = %occupant, square = %to, "Relocation onto occupied square");
            self.remove_piece(occupant);
        }

        self.positions.remove(&from);
        self.positions.insert(to, id);
        self.locations.insert(id, to);
        tracing::debug!(piece = %id, from = %from, to = %to, "Relocated piece");

        self.check_consistency();
        Ok(())
    }

    /// Take a piece off the board and out of the registry.
    ///
    /// Returns the removed piece, or `None` if it was not live.
    pub fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.remove(&id)?;
        if let Some(square) = self.locations.remove(&id) {
            self.positions.remove(&square);
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!(piece = %id, "Removed piece");

        self.check_consistency();
        Some(piece)
    }

    /// Square -> color+kind code map for renderers (`"e1" -> "wK"`).
    #[must_use]
    pub fn display_position(&self) -> BTreeMap<Square, String> {
        self.positions
            .iter()
            .filter_map(|(&sq, id)| self.pieces.get(id).map(|p| (sq, p.code())))
            .collect()
    }

    /// Move/combat log, oldest first.
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Append a log entry, dropping the oldest beyond [`LOG_CAPACITY`].
    pub fn push_log(&mut self, entry: impl Into<String>) {
        self.log.push(entry.into());
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    /// Check that the three indices agree and every piece is alive.
    ///
    /// Each piece must also match its id, and no live id may be ahead of the
    /// spawn counter, so [`GameState::spawn`] never reissues one.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() != self.locations.len() || self.locations.len() != self.pieces.len()
        {
            return Err(GameError::InvalidState(format!(
                "Index sizes differ: {} squares, {} locations, {} pieces",
                self.positions.len(),
                self.locations.len(),
                self.pieces.len()
            )));
        }
        for (&square, &id) in &self.positions {
            if self.locations.get(&id) != Some(&square) {
                return Err(GameError::InvalidState(format!(
                    "{square} holds {id} but {id} is located at {:?}",
                    self.locations.get(&id)
                )));
            }
        }
        for (id, piece) in &self.pieces {
            if !self.locations.contains_key(id) {
                return Err(GameError::InvalidState(format!("{id} is registered but not on the board")));
            }
            if piece.id != *id {
                return Err(GameError::InvalidState(format!("{id} registered as {}", piece.id)));
            }
            if piece.color != id.color || piece.kind != id.kind {
                return Err(GameError::InvalidState(format!(
                    "{id} holds a {} {}",
                    piece.color.display_name(),
                    piece.kind
                )));
            }
            let issued = self.spawned.get(&(id.color, id.kind)).copied().unwrap_or(0);
            if id.seq > issued {
                return Err(GameError::InvalidState(format!(
                    "{id} is ahead of the last issued number {issued}"
                )));
            }
            if piece.hp == 0 {
                return Err(GameError::InvalidState(format!("{id} is registered with 0 hp")));
            }
        }
        Ok(())
    }

    #[cfg(feature = "debug-validation")]
    fn check_consistency(&self) {
        if let Err(e) = self.validate() {
            panic!("Board indices out of sync: {e}");
        }
    }

    #[cfg(not(feature = "debug-validation"))]
    #[inline]
    fn check_consistency(&self) {}

    /// Hash of all observable state.
    ///
    /// Two states that compare equal produce the same hash, in every process.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the state to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize game state: {e}")))
    }

    /// Deserialize state from bytes and re-check its invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are malformed or describe an
    /// inconsistent board.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let state: Self = bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize game state: {e}")))?;
        state.validate()?;
        Ok(state)
    }
}

impl Default for GameState {
    fn default() -> Self {
        create_initial_state()
    }
}

/// Standard starting arrangement with the canonical stat table.
///
/// Deterministic: every call returns an identical state.
#[must_use]
pub fn create_initial_state() -> GameState {
    create_initial_state_with(StatTable::default())
}

/// Standard starting arrangement with a custom stat table.
///
/// Back rank R N B Q K B N R on rank 1 (White) and rank 8 (Black), pawns on
/// ranks 2 and 7. Ids are numbered per (color, kind) left to right, so the
/// a-file rook is `wR#1` and the h-file rook `wR#2`.
#[must_use]
pub fn create_initial_state_with(stats: StatTable) -> GameState {
    let mut state = GameState::empty_with(stats);
    for color in Color::ALL {
        for (file, kind) in (0..BOARD_SIZE).zip(PieceKind::BACK_RANK) {
            place_initial(&mut state, color, kind, file, color.back_rank());
        }
        for file in 0..BOARD_SIZE {
            place_initial(&mut state, color, PieceKind::Pawn, file, color.pawn_rank());
        }
    }
    state
}

fn place_initial(state: &mut GameState, color: Color, kind: PieceKind, file: u8, rank: u8) {
    if let Some(square) = Square::new(file, rank) {
        let stats = state.stats.get(kind);
        state.insert_piece(color, kind, square, stats);
    }
}

/// Current square of a live piece, or `None`.
#[must_use]
pub fn find_square(state: &GameState, id: PieceId) -> Option<Square> {
    state.square_of(id)
}

/// Piece id occupying a square, or `None`.
#[must_use]
pub fn find_piece_at(state: &GameState, square: Square) -> Option<PieceId> {
    state.piece_at(square)
}

/// Unconditional relocation primitive; see [`GameState::relocate`].
///
/// # Errors
///
/// Returns [`GameError::PieceNotFound`] if `id` is not a live piece.
pub fn move_piece(state: &mut GameState, id: PieceId, to: Square) -> Result<()> {
    state.relocate(id, to)
}

/// Square -> color+kind code map for renderers.
#[must_use]
pub fn to_display_position(state: &GameState) -> BTreeMap<Square, String> {
    state.display_position()
}

/// "White Rook" style description.
#[must_use]
pub fn describe_piece(piece: &Piece) -> String {
    piece.describe()
}

/// Fully independent deep copy of the state.
///
/// Every index owns its data, so the copy shares nothing with the original.
#[must_use]
pub fn clone_state(state: &GameState) -> GameState {
    state.clone()
}
