//! Replay system for recording and playing back matches.
//!
//! Replays store the starting position and the moves applied during the
//! match. Matches are fully deterministic, so the same moves from the same
//! position always reach the same final hash.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::movegen::Move;
use crate::session::{Match, TurnReport};
use crate::state::GameState;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Hash of a position ignoring presentation-only fields.
///
/// Board orientation and the current selection do not affect play, so a
/// replay recorded with a flipped board still verifies.
#[must_use]
pub fn outcome_hash(state: &GameState) -> u64 {
    let mut normalized = state.clone();
    normalized.flipped = false;
    normalized.selected = None;
    normalized.state_hash()
}

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Serialized starting position.
    pub initial_state: Vec<u8>,
    /// Moves in the order they were applied.
    pub moves: Vec<Move>,
    /// [`outcome_hash`] of the final position.
    pub final_hash: u64,
}

impl Replay {
    /// Create an empty replay starting from `initial`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized.
    pub fn new(initial: &GameState) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            initial_state: initial.serialize()?,
            moves: Vec::new(),
            final_hash: outcome_hash(initial),
        })
    }

    /// Capture a match: its starting position, move history, and final hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the starting state cannot be serialized.
    pub fn record(game: &Match) -> Result<Self> {
        let mut replay = Self::new(game.initial_state())?;
        replay.moves = game.history().to_vec();
        replay.final_hash = outcome_hash(game.state());
        Ok(replay)
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to write replay file: {e}")))?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails, or if the
    /// file was written by a different format version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| GameError::InvalidState(format!("Failed to read replay file: {e}")))?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }

        Ok(replay)
    }

    /// Starting position for playback.
    ///
    /// # Errors
    /// Returns an error if state deserialization fails.
    pub fn restore_initial_state(&self) -> Result<GameState> {
        GameState::deserialize(&self.initial_state)
    }

    /// Fresh match at the starting position.
    ///
    /// # Errors
    /// Returns an error if state deserialization fails.
    pub fn restore(&self) -> Result<Match> {
        Match::from_state(self.restore_initial_state()?)
    }

    /// Number of recorded moves.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Replay every move and compare the final hash.
    ///
    /// Returns `Ok(false)` on a hash mismatch.
    ///
    /// # Errors
    /// Returns an error if the starting state cannot be restored or a
    /// recorded move is rejected.
    pub fn verify(&self) -> Result<bool> {
        let mut player = ReplayPlayer::new(self.clone())?;
        player.verify()
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    game: Match,
    /// Index of the next move to apply.
    cursor: usize,
}

impl ReplayPlayer {
    /// Create a new replay player positioned before the first move.
    ///
    /// # Errors
    /// Returns an error if the starting state cannot be restored.
    pub fn new(replay: Replay) -> Result<Self> {
        let game = replay.restore()?;
        Ok(Self {
            replay,
            game,
            cursor: 0,
        })
    }

    /// Apply the next recorded move.
    ///
    /// Returns `Ok(None)` once every move has been applied.
    ///
    /// # Errors
    /// Returns an error if the recorded move is not legal in the current
    /// position.
    pub fn step(&mut self) -> Result<Option<TurnReport>> {
        let Some(&mv) = self.replay.moves.get(self.cursor) else {
            return Ok(None);
        };
        let report = self.game.play_move(mv.from, mv.to)?;
        self.cursor += 1;
        Ok(Some(report))
    }

    /// Jump to the position after `target` moves.
    ///
    /// # Errors
    /// Returns an error if state restoration or a recorded move fails.
    pub fn seek(&mut self, target: usize) -> Result<()> {
        self.game = self.replay.restore()?;
        self.cursor = 0;

        while self.cursor < target.min(self.replay.moves.len()) {
            self.step()?;
        }
        Ok(())
    }

    /// Number of moves applied so far.
    #[must_use]
    pub const fn current_move(&self) -> usize {
        self.cursor
    }

    /// The match as of the current move.
    #[must_use]
    pub const fn game(&self) -> &Match {
        &self.game
    }

    /// Get the replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Check if every move has been applied.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.replay.moves.len()
    }

    /// Play to the end and compare against the recorded final hash.
    ///
    /// # Errors
    /// Returns an error if state restoration or a recorded move fails.
    pub fn verify(&mut self) -> Result<bool> {
        self.seek(self.replay.moves.len())?;
        let actual = outcome_hash(self.game.state());
        if actual != self.replay.final_hash {
            tracing::warn!(
                expected = self.replay.final_hash,
                actual,
                "Replay final hash mismatch"
            );
        }
        Ok(actual == self.replay.final_hash)
    }

    /// Get progress as a percentage (0-100).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percent(&self) -> f64 {
        if self.replay.moves.is_empty() {
            100.0
        } else {
            (self.cursor as f64 / self.replay.moves.len() as f64) * 100.0
        }
    }
}
