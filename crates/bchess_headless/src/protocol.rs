//! JSON protocol for headless match communication.
//!
//! The runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Responses and state snapshots
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","turn":"white"}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every command with exactly one response
//! 4. `quit` (or end of input) ends the session with `{"type":"bye"}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","turn":"white"}
//! -> {"cmd":"select","square":"g1"}
//! <- {"type":"legal","square":"g1","moves":["f3","h3"]}
//! -> {"cmd":"move","from":"d2","to":"d3"}
//! <- {"type":"turn","report":{"mover":"wP#4","from":"d2","to":"d3",...}}
//! -> {"cmd":"hash"}
//! <- {"type":"state_hash","moves":1,"hash":1234567890}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bchess_core::piece::{Color, Piece, PieceKind};
use bchess_core::session::TurnReport;
use bchess_core::square::Square;
use bchess_core::stats::{PieceStats, StatTable};

/// Protocol version reported in the ready message.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Discard the current match and start a fresh one.
    New,

    /// Select the piece on a square; answers with its legal moves.
    Select { square: String },

    /// Legal moves of the piece on a square, without selecting it.
    Legal { square: String },

    /// Move or attack from one square to another.
    Move { from: String, to: String },

    /// Query the full match state.
    Query,

    /// Render the board as text.
    Board {
        #[serde(default)]
        hp: bool,
    },

    /// List the stat table in use.
    Stats,

    /// Current state hash (for determinism verification).
    Hash,

    /// Toggle board orientation.
    Flip,

    /// End the session.
    Quit,
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, turn: Color },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Legal destinations of the piece on `square`.
    Legal { square: Square, moves: Vec<Square> },

    /// A move was applied.
    Turn { report: TurnReport },

    /// Full match state.
    State {
        turn: Color,
        over: bool,
        status: Option<String>,
        position: BTreeMap<Square, String>,
        pieces: Vec<PieceState>,
        log: Vec<String>,
        hash: u64,
    },

    /// Text rendering of the board.
    Board { text: String },

    /// Stat table in stat-inspector order.
    Stats { entries: Vec<StatRow> },

    /// State hash for determinism verification.
    StateHash { moves: usize, hash: u64 },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// One live piece in a state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceState {
    pub id: String,
    pub square: Square,
    pub code: String,
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
}

impl PieceState {
    /// Snapshot a piece standing on `square`.
    pub fn new(piece: &Piece, square: Square) -> Self {
        Self {
            id: piece.id.to_string(),
            square,
            code: piece.code(),
            hp: piece.hp,
            atk: piece.atk,
            def: piece.def,
        }
    }
}

/// One line of the stat inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRow {
    pub kind: PieceKind,
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    /// Ray length, listed for sliding kinds only.
    #[serde(rename = "move", skip_serializing_if = "Option::is_none", default)]
    pub move_range: Option<u8>,
}

impl StatRow {
    /// Build a row from a stat line.
    pub fn new(kind: PieceKind, stats: PieceStats) -> Self {
        Self {
            kind,
            hp: stats.hp,
            atk: stats.atk,
            def: stats.def,
            move_range: kind.is_slider().then_some(stats.move_range),
        }
    }

    /// Rows for every kind of a table.
    pub fn table(table: &StatTable) -> Vec<Self> {
        table
            .entries()
            .into_iter()
            .map(|(kind, stats)| Self::new(kind, stats))
            .collect()
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(turn: Color) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            turn,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Select { .. } => "select",
            Self::Legal { .. } => "legal",
            Self::Move { .. } => "move",
            Self::Query => "query",
            Self::Board { .. } => "board",
            Self::Stats => "stats",
            Self::Hash => "hash",
            Self::Flip => "flip",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move_command() {
        let cmd = Command::from_json(r#"{"cmd":"move","from":"d2","to":"d3"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Move {
                from: "d2".into(),
                to: "d3".into()
            }
        );
        assert_eq!(cmd.name(), "move");
    }

    #[test]
    fn test_board_hp_defaults_off() {
        let cmd = Command::from_json(r#"{"cmd":"board"}"#).unwrap();
        assert_eq!(cmd, Command::Board { hp: false });
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::from_json(r#"{"cmd":"castle"}"#).is_err());
        assert!(Command::from_json("not json").is_err());
    }

    #[test]
    fn test_serialize_legal_response() {
        let resp = Response::Legal {
            square: "g1".parse().unwrap(),
            moves: vec!["f3".parse().unwrap(), "h3".parse().unwrap()],
        };
        let json = resp.to_json_line();
        assert_eq!(json, "{\"type\":\"legal\",\"square\":\"g1\",\"moves\":[\"f3\",\"h3\"]}\n");
    }

    #[test]
    fn test_ready_reports_version() {
        let json = Response::ready(Color::White).to_json_line();
        assert!(json.contains(r#""type":"ready""#));
        assert!(json.contains(r#""version":"1.0""#));
        assert!(json.contains(r#""turn":"white""#));
    }

    #[test]
    fn test_stat_rows_hide_move_for_fixed_kinds() {
        let rows = StatRow::table(&StatTable::default());
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].kind, PieceKind::King);
        assert_eq!(rows[0].move_range, None);
        assert_eq!(rows[1].move_range, Some(7));

        let json = serde_json::to_string(&rows[0]).unwrap();
        assert_eq!(json, r#"{"kind":"King","hp":10,"atk":3,"def":2}"#);
    }

    #[test]
    fn test_state_response_roundtrips_through_json() {
        let mut position = BTreeMap::new();
        position.insert("e1".parse().unwrap(), "wK".to_string());
        let resp = Response::State {
            turn: Color::Black,
            over: false,
            status: None,
            position,
            pieces: vec![],
            log: vec!["White Pawn moves d2 to d3".into()],
            hash: 42,
        };
        let back: Response = serde_json::from_str(resp.to_json_line().trim()).unwrap();
        assert_eq!(back, resp);
    }
}
