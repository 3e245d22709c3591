//! Data-driven piece statistics.
//!
//! Every piece starts with the stat line of its kind. The canonical table is
//! built in; alternative tables can be deserialized from RON for balance
//! experiments.
//!
//! **Note:** This module contains no IO - it only parses text handed to it.
//!
//! # Example RON
//!
//! ```ron
//! StatTable(
//!     king:   PieceStats(hp: 10, atk: 3, def: 2),
//!     queen:  PieceStats(hp: 7,  atk: 5, def: 1, move_range: 7),
//!     rook:   PieceStats(hp: 6,  atk: 4, def: 2, move_range: 7),
//!     bishop: PieceStats(hp: 5,  atk: 3, def: 1, move_range: 7),
//!     knight: PieceStats(hp: 5,  atk: 3, def: 2),
//!     pawn:   PieceStats(hp: 3,  atk: 2, def: 0),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::piece::PieceKind;

/// Ray length that reaches any square on an 8x8 board.
pub const FULL_RAY: u8 = 7;

/// Base statistics for one piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceStats {
    /// Starting hit points.
    pub hp: u32,
    /// Attack value.
    pub atk: u32,
    /// Defense value.
    pub def: u32,
    /// Maximum ray length for sliding kinds (0 for fixed-rule kinds).
    #[serde(default)]
    pub move_range: u8,
}

impl PieceStats {
    /// Create a stat line without a ray length.
    #[must_use]
    pub const fn new(hp: u32, atk: u32, def: u32) -> Self {
        Self {
            hp,
            atk,
            def,
            move_range: 0,
        }
    }

    /// Builder method to set the ray length.
    #[must_use]
    pub const fn with_move_range(mut self, move_range: u8) -> Self {
        self.move_range = move_range;
        self
    }

    /// Canonical stat line for a kind.
    #[must_use]
    pub const fn for_kind(kind: PieceKind) -> Self {
        match kind {
            PieceKind::King => Self::new(10, 3, 2),
            PieceKind::Queen => Self::new(7, 5, 1).with_move_range(FULL_RAY),
            PieceKind::Rook => Self::new(6, 4, 2).with_move_range(FULL_RAY),
            PieceKind::Bishop => Self::new(5, 3, 1).with_move_range(FULL_RAY),
            PieceKind::Knight => Self::new(5, 3, 2),
            PieceKind::Pawn => Self::new(3, 2, 0),
        }
    }
}

/// Stat lines for all six kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatTable {
    /// King stats.
    pub king: PieceStats,
    /// Queen stats.
    pub queen: PieceStats,
    /// Rook stats.
    pub rook: PieceStats,
    /// Bishop stats.
    pub bishop: PieceStats,
    /// Knight stats.
    pub knight: PieceStats,
    /// Pawn stats.
    pub pawn: PieceStats,
}

impl StatTable {
    /// Stat line for a kind.
    #[must_use]
    pub const fn get(&self, kind: PieceKind) -> PieceStats {
        match kind {
            PieceKind::King => self.king,
            PieceKind::Queen => self.queen,
            PieceKind::Rook => self.rook,
            PieceKind::Bishop => self.bishop,
            PieceKind::Knight => self.knight,
            PieceKind::Pawn => self.pawn,
        }
    }

    /// All `(kind, stats)` pairs in King, Queen, Rook, Bishop, Knight, Pawn order.
    #[must_use]
    pub fn entries(&self) -> Vec<(PieceKind, PieceStats)> {
        PieceKind::ALL.iter().map(|&k| (k, self.get(k))).collect()
    }

    /// Parse a table from RON text and validate it.
    ///
    /// `source_name` only labels the error message.
    pub fn from_ron_str(text: &str, source_name: &str) -> Result<Self> {
        let table: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        table.validate()?;
        Ok(table)
    }

    /// Render the table as pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize stat table: {e}")))
    }

    /// Check that every piece can exist on the board.
    ///
    /// Pieces need at least 1 hp, and sliding kinds need a ray length of
    /// 1..=7. Fixed-rule kinds ignore `move_range`.
    pub fn validate(&self) -> Result<()> {
        for (kind, stats) in self.entries() {
            if stats.hp == 0 {
                return Err(GameError::InvalidState(format!("{kind} must start with hp > 0")));
            }
            if kind.is_slider() && !(1..=FULL_RAY).contains(&stats.move_range) {
                return Err(GameError::InvalidState(format!(
                    "{kind} move_range must be between 1 and {FULL_RAY}, got {}",
                    stats.move_range
                )));
            }
        }
        Ok(())
    }
}

impl Default for StatTable {
    fn default() -> Self {
        Self {
            king: PieceStats::for_kind(PieceKind::King),
            queen: PieceStats::for_kind(PieceKind::Queen),
            rook: PieceStats::for_kind(PieceKind::Rook),
            bishop: PieceStats::for_kind(PieceKind::Bishop),
            knight: PieceStats::for_kind(PieceKind::Knight),
            pawn: PieceStats::for_kind(PieceKind::Pawn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_table() {
        let table = StatTable::default();
        assert_eq!(table.get(PieceKind::King), PieceStats::new(10, 3, 2));
        assert_eq!(table.get(PieceKind::Queen), PieceStats::new(7, 5, 1).with_move_range(7));
        assert_eq!(table.get(PieceKind::Rook), PieceStats::new(6, 4, 2).with_move_range(7));
        assert_eq!(table.get(PieceKind::Bishop), PieceStats::new(5, 3, 1).with_move_range(7));
        assert_eq!(table.get(PieceKind::Knight), PieceStats::new(5, 3, 2));
        assert_eq!(table.get(PieceKind::Pawn), PieceStats::new(3, 2, 0));
    }

    #[test]
    fn test_entries_order() {
        let kinds: Vec<PieceKind> = StatTable::default().entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, PieceKind::ALL.to_vec());
    }

    #[test]
    fn test_parse_ron_defaults_move_range() {
        let text = r"StatTable(
            king: PieceStats(hp: 12, atk: 3, def: 2),
            queen: PieceStats(hp: 7, atk: 5, def: 1, move_range: 3),
            rook: PieceStats(hp: 6, atk: 4, def: 2, move_range: 7),
            bishop: PieceStats(hp: 5, atk: 3, def: 1, move_range: 7),
            knight: PieceStats(hp: 5, atk: 3, def: 2),
            pawn: PieceStats(hp: 3, atk: 2, def: 0),
        )";
        let table = StatTable::from_ron_str(text, "inline").unwrap();
        assert_eq!(table.king.hp, 12);
        assert_eq!(table.king.move_range, 0);
        assert_eq!(table.queen.move_range, 3);
    }

    #[test]
    fn test_ron_text_roundtrip() {
        let table = StatTable::default();
        let text = table.to_ron_string().unwrap();
        assert_eq!(StatTable::from_ron_str(&text, "roundtrip").unwrap(), table);
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = StatTable::from_ron_str("StatTable(", "broken.ron").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { ref source_name, .. } if source_name == "broken.ron"));
    }

    #[test]
    fn test_validate_rejects_zero_hp_and_bad_rays() {
        let mut table = StatTable::default();
        table.pawn.hp = 0;
        assert!(table.validate().is_err());

        let mut table = StatTable::default();
        table.rook.move_range = 0;
        assert!(table.validate().is_err());

        let mut table = StatTable::default();
        table.bishop.move_range = 8;
        assert!(table.validate().is_err());

        // Fixed-rule kinds ignore move_range.
        let mut table = StatTable::default();
        table.knight.move_range = 42;
        assert!(table.validate().is_ok());
    }
}
