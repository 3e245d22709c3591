//! End-to-end engine scenarios.
//!
//! Drives the engine functions the way a board UI does: look up a piece,
//! read its legal moves, resolve the chosen destination.

use bchess_core::prelude::*;
use bchess_test_utils::fixtures::{match_after, sq, QUEEN_DEFEAT_OPENING};

const CANONICAL_STATS: &str = include_str!("../../../assets/data/piece_stats.ron");

fn setup_e5_target() -> (GameState, PieceId) {
    let mut state = create_initial_state();
    let white_pawn = find_piece_at(&state, sq("d2")).unwrap();
    move_piece(&mut state, white_pawn, sq("d4")).unwrap();
    let black_pawn = find_piece_at(&state, sq("e7")).unwrap();
    move_piece(&mut state, black_pawn, sq("e5")).unwrap();
    (state, black_pawn)
}

#[test]
fn queen_defeats_pawn_and_takes_its_square() {
    let (mut state, black_pawn) = setup_e5_target();
    // Clear the pawn off d4 so the queen can stand there.
    let white_pawn = find_piece_at(&state, sq("d4")).unwrap();
    move_piece(&mut state, white_pawn, sq("d3")).unwrap();
    let queen = find_piece_at(&state, sq("d1")).unwrap();
    move_piece(&mut state, queen, sq("d4")).unwrap();

    assert!(legal_moves(&state, queen).iter().any(|m| m.to == sq("e5")));
    let before = clone_state(&state);

    let outcome = resolve_combat(&mut state, queen, sq("e5")).unwrap();
    assert_eq!(outcome, CombatOutcome::Defeat { damage: 5 });
    assert_eq!(find_square(&state, queen), Some(sq("e5")));
    assert!(find_square(&state, black_pawn).is_none());

    // The snapshot still describes the defender for logging.
    let defender = before.piece(black_pawn).unwrap();
    assert_eq!(describe_piece(defender), "Black Pawn");
    assert_eq!(find_piece_at(&before, sq("e5")), Some(black_pawn));
}

#[test]
fn pawn_hit_leaves_both_pieces_in_place() {
    let (mut state, black_pawn) = setup_e5_target();
    let white_pawn = find_piece_at(&state, sq("d4")).unwrap();

    let moves = legal_moves(&state, white_pawn);
    assert_eq!(
        moves,
        vec![
            Move::new(sq("d4"), sq("d5")),
            Move::new(sq("d4"), sq("e5"))
        ]
    );

    let outcome = resolve_combat(&mut state, white_pawn, sq("e5")).unwrap();
    assert_eq!(
        outcome,
        CombatOutcome::Hit {
            damage: 2,
            remaining_hp: 1
        }
    );
    assert_eq!(find_square(&state, white_pawn), Some(sq("d4")));
    assert_eq!(find_square(&state, black_pawn), Some(sq("e5")));
    assert_eq!(state.piece(black_pawn).unwrap().hp, 1);

    // A second hit finishes the job.
    let outcome = resolve_combat(&mut state, white_pawn, sq("e5")).unwrap();
    assert_eq!(outcome, CombatOutcome::Defeat { damage: 2 });
    assert_eq!(find_piece_at(&state, sq("e5")), Some(white_pawn));
    state.validate().unwrap();
}

#[test]
fn display_position_tracks_combat() {
    let game = match_after(&QUEEN_DEFEAT_OPENING);
    let display = to_display_position(game.state());
    assert_eq!(display.len(), 31);
    assert_eq!(display[&sq("e5")], "wQ");
    assert!(!display.contains_key(&sq("f4")));
    assert!(!display.contains_key(&sq("d1")));
}

#[test]
fn shipped_stat_file_matches_builtin_table() {
    let table = StatTable::from_ron_str(CANONICAL_STATS, "piece_stats.ron").unwrap();
    assert_eq!(table, StatTable::default());
}

#[test]
fn stat_table_drives_initial_pieces() {
    let mut table = StatTable::default();
    table.rook = PieceStats::new(9, 4, 3).with_move_range(2);
    let state = create_initial_state_with(table);

    let rook = state.occupant(sq("h8")).unwrap();
    assert_eq!((rook.hp, rook.def, rook.move_range), (9, 3, 2));
    assert_eq!(state.stats().rook.hp, 9);
    assert_ne!(state, create_initial_state());
}

#[test]
fn match_log_reads_like_a_game_record() {
    let game = match_after(&QUEEN_DEFEAT_OPENING);
    assert_eq!(
        game.state().log(),
        [
            "White Pawn moves d2 to d3",
            "Black Pawn moves e7 to e6",
            "White Queen moves d1 to d2",
            "Black Pawn moves e6 to e5",
            "White Queen moves d2 to f4",
            "Black Pawn moves a7 to a6",
            "White Queen attacks Black Pawn at e5 for 5, defeated",
        ]
    );
    assert_eq!(game.state().turn, Color::Black);
}

#[test]
fn replay_of_match_verifies_after_save() {
    let game = match_after(&QUEEN_DEFEAT_OPENING);
    let replay = Replay::record(&game).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queen.replay");
    replay.save(&path).unwrap();

    let loaded = Replay::load(&path).unwrap();
    assert_eq!(loaded.move_count(), QUEEN_DEFEAT_OPENING.len());
    assert!(loaded.verify().unwrap());
}

#[test]
fn snapshot_bytes_restore_the_same_match_state() {
    let game = match_after(&QUEEN_DEFEAT_OPENING);
    let bytes = game.state().serialize().unwrap();
    let restored = GameState::deserialize(&bytes).unwrap();
    assert_eq!(&restored, game.state());
    assert_eq!(restored.state_hash(), game.state().state_hash());
}
