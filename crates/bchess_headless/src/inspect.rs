//! One-shot CLI operations: stat inspection, scripted play, replay checks.

use std::path::Path;

use clap::ValueEnum;

use bchess_core::movegen::Move;
use bchess_core::replay::{outcome_hash, Replay, ReplayPlayer};
use bchess_core::session::Match;
use bchess_core::stats::StatTable;

use crate::error::{HeadlessError, Result};
use crate::protocol::StatRow;

/// Output format for the stat inspector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatsFormat {
    /// Aligned text columns.
    #[default]
    Table,
    /// Pretty JSON array.
    Json,
    /// Pretty RON list.
    Ron,
}

/// Load a stat table from a RON file, or the canonical table for `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_stat_table(path: Option<&Path>) -> Result<StatTable> {
    let Some(path) = path else {
        return Ok(StatTable::default());
    };
    let text = std::fs::read_to_string(path)?;
    let table = StatTable::from_ron_str(&text, &path.display().to_string())?;
    tracing::info!(path = %path.display(), "Loaded stat table");
    Ok(table)
}

/// Render the stat inspector.
///
/// `move` is listed for sliding kinds only.
///
/// # Errors
///
/// Returns an error if JSON or RON serialization fails.
pub fn format_stats(table: &StatTable, format: StatsFormat) -> Result<String> {
    let rows = StatRow::table(table);
    let text = match format {
        StatsFormat::Table => {
            let mut out = format!("{:<8}{:>4}{:>5}{:>5}{:>6}\n", "Kind", "HP", "ATK", "DEF", "MOVE");
            for row in &rows {
                let range = row
                    .move_range
                    .map_or_else(|| "-".to_string(), |r| r.to_string());
                out.push_str(&format!(
                    "{:<8}{:>4}{:>5}{:>5}{:>6}\n",
                    row.kind.name(),
                    row.hp,
                    row.atk,
                    row.def,
                    range
                ));
            }
            out
        }
        StatsFormat::Json => serde_json::to_string_pretty(&rows)? + "\n",
        StatsFormat::Ron => {
            ron::ser::to_string_pretty(&rows, ron::ser::PrettyConfig::default())? + "\n"
        }
    };
    Ok(text)
}

/// Play a list of moves (`d2d3` or `d2-d3`) from the standard setup.
///
/// # Errors
///
/// Returns an error on the first move that does not parse or is rejected.
pub fn play_script<S: AsRef<str>>(moves: &[S], stats: StatTable) -> Result<Match> {
    let mut game = Match::with_stats(stats);
    for text in moves {
        let mv: Move = text.as_ref().parse()?;
        let report = game.play_move(mv.from, mv.to)?;
        tracing::debug!(mv = %mv, line = %report.log_line, "Applied scripted move");
    }
    Ok(game)
}

/// Load a replay, play it back, and check its final hash.
///
/// Returns the verified hash.
///
/// # Errors
///
/// Returns [`HeadlessError::ReplayMismatch`] if playback ends on a different
/// position, or any load/playback error.
pub fn verify_replay(path: &Path) -> Result<u64> {
    let replay = Replay::load(path)?;
    tracing::info!(
        path = %path.display(),
        moves = replay.move_count(),
        "Verifying replay"
    );

    let mut player = ReplayPlayer::new(replay)?;
    let expected = player.replay().final_hash;
    if player.verify()? {
        Ok(expected)
    } else {
        Err(HeadlessError::ReplayMismatch {
            expected,
            actual: outcome_hash(player.game().state()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_format() {
        let text = format_stats(&StatTable::default(), StatsFormat::Table).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Kind      HP  ATK  DEF  MOVE");
        assert_eq!(lines[1], "King      10    3    2     -");
        assert_eq!(lines[2], "Queen      7    5    1     7");
        assert_eq!(lines[6], "Pawn       3    2    0     -");
    }

    #[test]
    fn test_json_and_ron_formats() {
        let json = format_stats(&StatTable::default(), StatsFormat::Json).unwrap();
        let rows: Vec<StatRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows, StatRow::table(&StatTable::default()));

        let ron_text = format_stats(&StatTable::default(), StatsFormat::Ron).unwrap();
        assert!(ron_text.contains("Queen"));
    }

    #[test]
    fn test_play_script_stops_on_bad_move() {
        let game = play_script(&["d2d3", "e7-e6"], StatTable::default()).unwrap();
        assert_eq!(game.history().len(), 2);

        assert!(play_script(&["d2d4"], StatTable::default()).is_err());
        assert!(play_script(&["nonsense"], StatTable::default()).is_err());
    }

    #[test]
    fn test_default_stats_without_file() {
        assert_eq!(load_stat_table(None).unwrap(), StatTable::default());
    }
}
