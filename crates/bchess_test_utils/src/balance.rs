//! Balance testing utilities for stat tables.
//!
//! Two views of a [`StatTable`]:
//!
//! - a hits-to-defeat matrix for every attacker/defender kind pair
//! - win tallies from many scripted matches played with the table

use serde::Serialize;

use bchess_core::combat::calculate_damage;
use bchess_core::piece::{Color, PieceKind};
use bchess_core::session::Match;
use bchess_core::stats::StatTable;

use crate::fixtures::play_out;

/// One attacker/defender pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Matchup {
    /// Attacking kind.
    pub attacker: PieceKind,
    /// Defending kind.
    pub defender: PieceKind,
    /// Damage per attack.
    pub damage: u32,
    /// Attacks needed to defeat a full-strength defender.
    pub hits_to_defeat: u32,
}

/// Attacks an attacker needs to defeat a full-strength defender.
#[must_use]
pub fn hits_to_defeat(table: &StatTable, attacker: PieceKind, defender: PieceKind) -> u32 {
    let damage = calculate_damage(table.get(attacker).atk, table.get(defender).def);
    table.get(defender).hp.div_ceil(damage)
}

/// Hits-to-defeat for every kind pair, attacker-major.
#[must_use]
pub fn matchup_matrix(table: &StatTable) -> Vec<Matchup> {
    let mut results = Vec::with_capacity(PieceKind::ALL.len() * PieceKind::ALL.len());
    for attacker in PieceKind::ALL {
        for defender in PieceKind::ALL {
            results.push(Matchup {
                attacker,
                defender,
                damage: calculate_damage(table.get(attacker).atk, table.get(defender).def),
                hits_to_defeat: hits_to_defeat(table, attacker, defender),
            });
        }
    }
    results
}

/// Render the matchup matrix as pretty RON for balance reviews.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn matrix_to_ron(table: &StatTable) -> Result<String, ron::Error> {
    ron::ser::to_string_pretty(&matchup_matrix(table), ron::ser::PrettyConfig::default())
}

/// Win tallies over a batch of scripted matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchTally {
    /// Matches played.
    pub total: u32,
    /// Matches won by White.
    pub white_wins: u32,
    /// Matches won by Black.
    pub black_wins: u32,
    /// Matches that hit the move cap without a winner.
    pub unfinished: u32,
    /// Mean number of moves per match.
    pub avg_moves: f64,
}

impl MatchTally {
    /// White's share of all matches (0.0 to 1.0).
    #[must_use]
    pub fn white_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        f64::from(self.white_wins) / f64::from(self.total)
    }

    /// Check whether White's win rate falls in the given range.
    #[must_use]
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.white_rate();
        rate >= min_rate && rate <= max_rate
    }
}

/// Play one scripted match per seed and tally the results.
#[must_use]
pub fn run_matches(table: &StatTable, seeds: std::ops::Range<u64>, max_moves: usize) -> MatchTally {
    let mut tally = MatchTally::default();
    let mut moves_total = 0usize;

    for seed in seeds {
        let mut game = Match::with_stats(table.clone());
        moves_total += play_out(&mut game, seed, max_moves);
        tally.total += 1;
        match game.winner() {
            Some(Color::White) => tally.white_wins += 1,
            Some(Color::Black) => tally.black_wins += 1,
            None => tally.unfinished += 1,
        }
    }

    if tally.total > 0 {
        #[allow(clippy::cast_precision_loss)]
        let avg = moves_total as f64 / f64::from(tally.total);
        tally.avg_moves = avg;
    }
    tally
}
