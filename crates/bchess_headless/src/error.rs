//! Errors raised by the runner and CLI.

use thiserror::Error;

use bchess_core::error::GameError;

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Everything that can stop a headless session.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Reading commands or writing responses failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine rejected an operation.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A protocol line could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stat output could not be rendered as RON.
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    /// A replay played back to a different final position.
    #[error("Replay hash mismatch: expected {expected:016x}, got {actual:016x}")]
    ReplayMismatch {
        /// Hash stored in the replay.
        expected: u64,
        /// Hash reached by playback.
        actual: u64,
    },
}
