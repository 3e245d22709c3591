//! Headless battle chess runner for scripted play and CI verification.
//!
//! This crate drives [`bchess_core`] without a graphical board. The runner
//! is controlled via JSON commands on stdin, with responses on stdout. This
//! enables:
//!
//! - **Scripted play**: A controller program can play whole matches
//! - **CI verification**: Automated checks of rules and determinism
//! - **Replay verification**: Check that replays reach identical positions
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (select, move, query, etc.)
//! - **stdout**: Responses and state snapshots (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See the [`protocol`] module for the full command/response specification.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"move","from":"d2","to":"d3"}' | cargo run -p bchess_headless
//!
//! # Play a fixed opening and save it
//! cargo run -p bchess_headless -- play d2d3 e7e6 --replay opening.replay
//!
//! # Verify a replay
//! cargo run -p bchess_headless -- verify opening.replay
//! ```

pub mod ascii_board;
pub mod error;
pub mod inspect;
pub mod protocol;
pub mod runner;

pub use ascii_board::{render_board, BoardConfig};
pub use error::{HeadlessError, Result};
pub use inspect::{format_stats, load_stat_table, play_script, verify_replay, StatsFormat};
pub use protocol::{Command, Response};
pub use runner::{HeadlessRunner, RunnerConfig};
