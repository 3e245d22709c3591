//! Test fixtures and helpers.
//!
//! Pre-built positions and scripted play for consistent testing.

use bchess_core::movegen::{all_legal_moves, Move};
use bchess_core::piece::{Color, PieceId, PieceKind};
use bchess_core::session::{Match, TurnReport};
use bchess_core::square::Square;
use bchess_core::state::GameState;
use bchess_core::stats::PieceStats;

/// Parse a square, panicking on bad input.
///
/// Only for test setup with literal squares.
#[must_use]
pub fn sq(text: &str) -> Square {
    text.parse()
        .unwrap_or_else(|e| panic!("bad square literal {text:?}: {e}"))
}

/// Parse a move like `d2d4`, panicking on bad input.
#[must_use]
pub fn mv(text: &str) -> Move {
    text.parse()
        .unwrap_or_else(|e| panic!("bad move literal {text:?}: {e}"))
}

/// Start a match and apply a sequence of moves.
///
/// # Panics
///
/// Panics if any move is rejected.
#[must_use]
pub fn match_after(moves: &[&str]) -> Match {
    let mut game = Match::new();
    for text in moves {
        let m = mv(text);
        game.play_move(m.from, m.to)
            .unwrap_or_else(|e| panic!("move {text} rejected: {e}"));
    }
    game
}

/// Opening that ends with a white pawn hitting a black pawn on e5.
pub const PAWN_HIT_OPENING: [&str; 5] = ["d2d3", "e7e6", "d3d4", "e6e5", "d4e5"];

/// Opening that ends with the white queen defeating the e5 pawn.
pub const QUEEN_DEFEAT_OPENING: [&str; 7] =
    ["d2d3", "e7e6", "d1d2", "e6e5", "d2f4", "a7a6", "f4e5"];

/// Board holding only an attacker on d4 and a defender on e5.
///
/// # Panics
///
/// Panics if the stat lines carry zero hp.
#[must_use]
pub fn duel(
    attacker: (Color, PieceKind, PieceStats),
    defender: (Color, PieceKind, PieceStats),
) -> (GameState, PieceId, PieceId) {
    let mut state = GameState::empty();
    let a = state
        .spawn_with(attacker.0, attacker.1, sq("d4"), attacker.2)
        .unwrap_or_else(|e| panic!("cannot place attacker: {e}"));
    let d = state
        .spawn_with(defender.0, defender.1, sq("e5"), defender.2)
        .unwrap_or_else(|e| panic!("cannot place defender: {e}"));
    (state, a, d)
}

/// Bare kings on their home squares.
#[must_use]
pub fn kings_only() -> GameState {
    let mut state = GameState::empty();
    for (color, square) in [(Color::White, "e1"), (Color::Black, "e8")] {
        state
            .spawn(color, PieceKind::King, sq(square))
            .unwrap_or_else(|e| panic!("cannot place king: {e}"));
    }
    state
}

/// Deterministic move choice for automated play.
///
/// Attacks are preferred so scripted games make progress; among equals the
/// pick rotates with `seed` and the number of moves played.
#[must_use]
pub fn scripted_move(game: &Match, seed: u64) -> Option<Move> {
    let state = game.state();
    if state.over {
        return None;
    }
    let moves = all_legal_moves(state, state.turn);
    let attacks: Vec<Move> = moves
        .iter()
        .map(|&(_, m)| m)
        .filter(|m| state.piece_at(m.to).is_some())
        .collect();
    let pool: Vec<Move> = if attacks.is_empty() {
        moves.into_iter().map(|(_, m)| m).collect()
    } else {
        attacks
    };
    if pool.is_empty() {
        return None;
    }
    let turn = game.history().len() as u64;
    let index = seed.wrapping_mul(31).wrapping_add(turn.wrapping_mul(7)) % pool.len() as u64;
    pool.get(usize::try_from(index).ok()?).copied()
}

/// Play one scripted move. Returns `None` when no move is available.
///
/// # Panics
///
/// Panics if the match rejects a move it reported as legal.
pub fn play_scripted(game: &mut Match, seed: u64) -> Option<TurnReport> {
    let m = scripted_move(game, seed)?;
    Some(
        game.play_move(m.from, m.to)
            .unwrap_or_else(|e| panic!("scripted move {m} rejected: {e}")),
    )
}

/// Play scripted moves until the match ends or `max_moves` are played.
pub fn play_out(game: &mut Match, seed: u64, max_moves: usize) -> usize {
    let mut played = 0;
    while played < max_moves && play_scripted(game, seed).is_some() {
        played += 1;
    }
    tracing::debug!(seed, played, over = game.is_over(), "Scripted playout finished");
    played
}

#[cfg(test)]
mod tests {
    use super::*;
    use bchess_core::combat::CombatOutcome;

    #[test]
    fn test_openings_reach_expected_outcomes() {
        let hit = match_after(&PAWN_HIT_OPENING);
        assert_eq!(hit.state().occupant(sq("e5")).map(|p| p.hp), Some(1));

        let defeat = match_after(&QUEEN_DEFEAT_OPENING);
        assert_eq!(
            defeat.state().occupant(sq("e5")).map(|p| p.kind),
            Some(PieceKind::Queen)
        );
    }

    #[test]
    fn test_duel_places_both_pieces() {
        let (state, a, d) = duel(
            (Color::White, PieceKind::Knight, PieceStats::for_kind(PieceKind::Knight)),
            (Color::Black, PieceKind::Rook, PieceStats::for_kind(PieceKind::Rook)),
        );
        assert_eq!(state.square_of(a), Some(sq("d4")));
        assert_eq!(state.square_of(d), Some(sq("e5")));
    }

    #[test]
    fn test_scripted_move_prefers_attacks() {
        let mut game = match_after(&["d2d3", "e7e6", "d3d4", "e6e5"]);
        let report = play_scripted(&mut game, 0).unwrap();
        assert!(matches!(report.outcome, CombatOutcome::Hit { .. }));
    }

    #[test]
    fn test_play_out_respects_move_cap() {
        let mut game = Match::from_state(kings_only()).unwrap();
        play_out(&mut game, 3, 500);
        assert!(game.history().len() <= 500);
        game.state().validate().unwrap();
    }
}
