//! Match controller.
//!
//! [`Match`] is the single owner of a [`GameState`] during play. It enforces
//! the rules the engine functions leave to their caller:
//!
//! - only the side to move may select a piece
//! - a destination must come from the selected piece's legal moves
//! - the turn passes after every applied move
//! - defeating a king ends the match
//!
//! Every applied move appends one line to the state's bounded log and is
//! recorded in the move history used by [`crate::replay`].

use serde::{Deserialize, Serialize};

use crate::combat::{resolve_combat, CombatOutcome};
use crate::error::{GameError, Result};
use crate::movegen::{legal_moves, Move};
use crate::piece::{Color, PieceId, PieceKind};
use crate::square::Square;
use crate::state::{clone_state, create_initial_state_with, GameState};
use crate::stats::StatTable;

pub use crate::state::LOG_CAPACITY;

/// Summary of one applied move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Piece that moved or attacked.
    pub mover: PieceId,
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// What happened on the destination.
    pub outcome: CombatOutcome,
    /// Piece that stood on the destination, if any.
    pub defender: Option<PieceId>,
    /// Line appended to the match log.
    pub log_line: String,
    /// Set when this move defeated a king.
    pub winner: Option<Color>,
}

/// One match in progress.
#[derive(Debug, Clone)]
pub struct Match {
    state: GameState,
    /// Position the match started from, kept for replays.
    initial: GameState,
    /// Legal moves of the selected piece.
    legal: Vec<Move>,
    history: Vec<Move>,
}

impl Match {
    /// Start a match from the standard setup with canonical stats.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stats(StatTable::default())
    }

    /// Start a match from the standard setup with a custom stat table.
    #[must_use]
    pub fn with_stats(stats: StatTable) -> Self {
        let state = create_initial_state_with(stats);
        Self {
            initial: state.clone(),
            state,
            legal: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Start a match from an arbitrary position.
    ///
    /// Any selection carried by `state` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the position fails
    /// [`GameState::validate`].
    pub fn from_state(mut state: GameState) -> Result<Self> {
        state.validate()?;
        state.selected = None;
        Ok(Self {
            initial: state.clone(),
            state,
            legal: Vec::new(),
            history: Vec::new(),
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Position the match started from.
    #[must_use]
    pub const fn initial_state(&self) -> &GameState {
        &self.initial
    }

    /// Moves applied so far, in order.
    #[must_use]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Selected piece, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<PieceId> {
        self.state.selected
    }

    /// Legal moves of the selected piece (empty without a selection).
    #[must_use]
    pub fn selection_moves(&self) -> &[Move] {
        &self.legal
    }

    /// Whether a king has been defeated.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.state.over
    }

    /// Side that defeated the opposing king, once the match is over.
    #[must_use]
    pub const fn winner(&self) -> Option<Color> {
        self.state.winner
    }

    /// Pick up a piece of the side to move and cache its legal moves.
    ///
    /// # Errors
    ///
    /// - [`GameError::GameOver`] once a king has fallen
    /// - [`GameError::PieceNotFound`] if `id` is not on the board
    /// - [`GameError::WrongSide`] if the piece belongs to the other side
    pub fn select(&mut self, id: PieceId) -> Result<&[Move]> {
        if self.state.over {
            return Err(GameError::GameOver);
        }
        let piece = self.state.piece(id).ok_or(GameError::PieceNotFound(id))?;
        if piece.color != self.state.turn {
            tracing::warn!(piece = %id, turn = %self.state.turn, "Rejected selection of opposing piece");
            return Err(GameError::WrongSide {
                piece: id,
                turn: self.state.turn,
            });
        }

        self.legal = legal_moves(&self.state, id);
        self.state.selected = Some(id);
        tracing::debug!(piece = %id, moves = self.legal.len(), "Selected piece");
        Ok(&self.legal)
    }

    /// Select whatever piece stands on `square`.
    ///
    /// # Errors
    ///
    /// [`GameError::EmptySquare`] if nothing stands there, otherwise as
    /// [`Match::select`].
    pub fn select_at(&mut self, square: Square) -> Result<&[Move]> {
        let id = self
            .state
            .piece_at(square)
            .ok_or(GameError::EmptySquare(square))?;
        self.select(id)
    }

    /// Drop the current selection.
    pub fn clear_selection(&mut self) {
        self.state.selected = None;
        self.legal.clear();
    }

    /// Move or attack with the selected piece.
    ///
    /// The selection is cleared whether or not the move is applied, like a
    /// dragged piece snapping back to its square.
    ///
    /// # Errors
    ///
    /// - [`GameError::GameOver`] once a king has fallen
    /// - [`GameError::NoSelection`] without a selected piece
    /// - [`GameError::IllegalMove`] if `to` is not a legal destination
    pub fn play(&mut self, to: Square) -> Result<TurnReport> {
        let selected = self.state.selected;
        let legal = std::mem::take(&mut self.legal);
        self.clear_selection();

        if self.state.over {
            return Err(GameError::GameOver);
        }
        let mover = selected.ok_or(GameError::NoSelection)?;
        let from = self
            .state
            .square_of(mover)
            .ok_or(GameError::PieceNotFound(mover))?;

        if !legal.iter().any(|m| m.to == to) {
            tracing::warn!(piece = %mover, from = %from, to = %to, "Rejected illegal move");
            return Err(GameError::IllegalMove {
                piece: mover,
                from,
                to,
            });
        }

        let before = clone_state(&self.state);
        let outcome = resolve_combat(&mut self.state, mover, to)?;
        let report = self.finish_turn(&before, mover, Move::new(from, to), outcome);

        tracing::debug!(
            turn = self.history.len(),
            state_hash = self.state.state_hash(),
            "Match state hash"
        );
        Ok(report)
    }

    /// Select the piece on `from` and play it to `to`.
    ///
    /// # Errors
    ///
    /// Any error of [`Match::select_at`] or [`Match::play`].
    pub fn play_move(&mut self, from: Square, to: Square) -> Result<TurnReport> {
        self.select_at(from)?;
        self.play(to)
    }

    /// Toggle which side is drawn at the bottom of the board.
    pub fn flip_board(&mut self) {
        self.state.flipped = !self.state.flipped;
    }

    /// Write the log line, detect a fallen king, and pass the turn.
    fn finish_turn(
        &mut self,
        before: &GameState,
        mover: PieceId,
        mv: Move,
        outcome: CombatOutcome,
    ) -> TurnReport {
        let attacker = before.piece(mover).map(|p| p.describe()).unwrap_or_default();
        let defender = before.occupant(mv.to);

        let log_line = match (outcome, defender) {
            (CombatOutcome::Hit { damage, remaining_hp }, Some(d)) => format!(
                "{attacker} attacks {} at {} for {damage}, {remaining_hp} HP left",
                d.describe(),
                mv.to
            ),
            (CombatOutcome::Defeat { damage }, Some(d)) => format!(
                "{attacker} attacks {} at {} for {damage}, defeated",
                d.describe(),
                mv.to
            ),
            _ => format!("{attacker} moves {} to {}", mv.from, mv.to),
        };
        self.state.push_log(log_line.clone());

        let king_fell = matches!(outcome, CombatOutcome::Defeat { .. })
            && defender.is_some_and(|d| d.kind == PieceKind::King);
        let winner = king_fell.then_some(mover.color);

        if let Some(color) = winner {
            let status = format!("{color} wins (king defeated)");
            tracing::info!(winner = %color, moves = self.history.len() + 1, "{status}");
            self.state.over = true;
            self.state.winner = Some(color);
            self.state.status = Some(status);
        } else {
            self.state.turn = self.state.turn.opponent();
        }
        self.history.push(mv);

        TurnReport {
            mover,
            from: mv.from,
            to: mv.to,
            outcome,
            defender: defender.map(|d| d.id),
            log_line,
            winner,
        }
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}
