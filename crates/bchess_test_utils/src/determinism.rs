//! Determinism testing utilities.
//!
//! Provides a harness for verifying that matches produce identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays only work if the engine is 100% deterministic. Sources of
//! non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Board indices are `BTreeMap`s, so iteration is always in square or id
//!   order.
//!
//! - **System randomness**: The engine never draws random numbers. Scripted
//!   play derives every choice from an explicit seed.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual operations (move generation, combat)
//! 2. **Property tests**: Random move sequences keep every invariant
//! 3. **Integration tests**: Full scripted matches are reproducible

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use bchess_core::session::Match;
use bchess_core::state::GameState;

use crate::fixtures::play_scripted;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a setup/step loop multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use bchess_test_utils::determinism::verify_determinism;
/// use bchess_test_utils::fixtures::play_scripted;
/// use bchess_core::session::Match;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 moves each
///     Match::new,
///     |game| { play_scripted(game, 7); },
///     |game| game.state().state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Play the same scripted match twice and compare final hashes.
pub fn verify_match_determinism<F>(setup_fn: F, seed: u64, moves: u64) -> bool
where
    F: Fn() -> Match,
{
    verify_determinism(
        2,
        moves,
        &setup_fn,
        |game| {
            play_scripted(game, seed);
        },
        |game| game.state().state_hash(),
    )
    .is_deterministic
}

/// Play two copies of a match move-by-move, finding the first divergence.
///
/// # Returns
///
/// `None` if the copies stay identical, `Some(n)` if they differ after
/// `n` moves.
pub fn find_first_divergence<F>(setup_fn: F, seed: u64, moves: u64) -> Option<u64>
where
    F: Fn() -> Match,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state().state_hash() != b.state().state_hash() {
        return Some(0);
    }

    for n in 1..=moves {
        play_scripted(&mut a, seed);
        play_scripted(&mut b, seed);

        if a.state().state_hash() != b.state().state_hash() {
            return Some(n);
        }
    }

    None
}

/// Verify that a serialization round trip preserves the state exactly.
pub fn verify_serialization_determinism(state: &GameState) -> bool {
    let hash_before = state.state_hash();

    let Ok(bytes) = state.serialize() else {
        return false;
    };
    let Ok(restored) = GameState::deserialize(&bytes) else {
        return false;
    };

    restored == *state && restored.state_hash() == hash_before
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for engine testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based tests.
pub mod strategies {
    use proptest::prelude::*;

    use bchess_core::movegen::{all_legal_moves, Move};
    use bchess_core::piece::{Color, PieceKind};
    use bchess_core::session::Match;
    use bchess_core::square::{Square, BOARD_SIZE};
    use bchess_core::state::GameState;
    use bchess_core::stats::{PieceStats, StatTable, FULL_RAY};

    /// Generate any board square.
    pub fn arb_square() -> impl Strategy<Value = Square> {
        (0..BOARD_SIZE, 0..BOARD_SIZE)
            .prop_filter_map("on board", |(file, rank)| Square::new(file, rank))
    }

    /// Generate a side.
    pub fn arb_color() -> impl Strategy<Value = Color> {
        prop_oneof![Just(Color::White), Just(Color::Black)]
    }

    /// Generate a piece kind.
    pub fn arb_kind() -> impl Strategy<Value = PieceKind> {
        proptest::sample::select(PieceKind::ALL.to_vec())
    }

    /// Generate a playable stat line (hp 1-20, atk/def 0-8, ray 1-7).
    pub fn arb_piece_stats() -> impl Strategy<Value = PieceStats> {
        (1u32..20, 0u32..8, 0u32..8, 1u8..=FULL_RAY).prop_map(|(hp, atk, def, range)| {
            PieceStats::new(hp, atk, def).with_move_range(range)
        })
    }

    /// Generate a stat table that passes validation.
    pub fn arb_stat_table() -> impl Strategy<Value = StatTable> {
        proptest::array::uniform6(arb_piece_stats()).prop_map(|[king, queen, rook, bishop, knight, pawn]| {
            StatTable {
                king,
                queen,
                rook,
                bishop,
                knight,
                pawn,
            }
        })
    }

    /// Generate a sparse position of up to `max_pieces` pieces.
    ///
    /// Pieces that would land on an occupied square are skipped.
    pub fn arb_position(max_pieces: usize) -> impl Strategy<Value = GameState> {
        proptest::collection::vec((arb_color(), arb_kind(), arb_square()), 0..max_pieces).prop_map(
            |placements| {
                let mut state = GameState::empty();
                for (color, kind, square) in placements {
                    let _ = state.spawn(color, kind, square);
                }
                state
            },
        )
    }

    /// Generate move choices; each value indexes the legal moves available.
    pub fn arb_move_choices(max_len: usize) -> impl Strategy<Value = Vec<usize>> {
        proptest::collection::vec(any::<usize>(), 0..max_len)
    }

    /// Apply choices to a match, stopping early when no move is available.
    ///
    /// Returns the moves that were applied.
    pub fn apply_choices(game: &mut Match, choices: &[usize]) -> Vec<Move> {
        let mut applied = Vec::with_capacity(choices.len());
        for &choice in choices {
            let state = game.state();
            if state.over {
                break;
            }
            let moves = all_legal_moves(state, state.turn);
            let Some(&(_, mv)) = moves.get(choice % moves.len().max(1)) else {
                break;
            };
            if game.play_move(mv.from, mv.to).is_err() {
                break;
            }
            applied.push(mv);
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures::{match_after, play_out, sq, PAWN_HIT_OPENING};
    use bchess_core::movegen::legal_moves;
    use bchess_core::piece::Color;
    use bchess_core::replay::Replay;
    use bchess_core::state::{clone_state, create_initial_state, move_piece};
    use proptest::prelude::*;

    // =========================================================================
    // Basic determinism tests
    // =========================================================================

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_scripted_match_determinism() {
        for seed in 0..4 {
            assert!(verify_match_determinism(Match::new, seed, 120));
        }
    }

    #[test]
    fn test_no_divergence_between_copies() {
        assert!(find_first_divergence(Match::new, 11, 150).is_none());
    }

    #[test]
    fn test_initial_state_hash_is_stable() {
        assert_eq!(
            compute_hash(&create_initial_state()),
            create_initial_state().state_hash()
        );
    }

    // =========================================================================
    // Serialization round-trip tests
    // =========================================================================

    #[test]
    fn test_serialization_preserves_initial_state() {
        assert!(verify_serialization_determinism(&create_initial_state()));
    }

    #[test]
    fn test_serialization_preserves_damaged_state() {
        let game = match_after(&PAWN_HIT_OPENING);
        assert_eq!(game.state().occupant(sq("e5")).map(|p| p.hp), Some(1));
        assert!(verify_serialization_determinism(game.state()));
    }

    #[test]
    fn test_scripted_playout_replays() {
        let mut game = Match::new();
        play_out(&mut game, 5, 200);
        let replay = Replay::record(&game).unwrap();
        assert!(replay.verify().unwrap());
    }

    // =========================================================================
    // Property tests
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_random_play_keeps_indices_consistent(choices in arb_move_choices(120)) {
            let mut game = Match::new();
            let applied = apply_choices(&mut game, &choices);
            prop_assert!(game.state().validate().is_ok());
            prop_assert_eq!(game.history(), applied.as_slice());
            prop_assert!(game.state().piece_count() <= 32);
        }

        #[test]
        fn prop_random_play_is_reproducible(choices in arb_move_choices(80)) {
            let mut a = Match::new();
            let mut b = Match::new();
            apply_choices(&mut a, &choices);
            apply_choices(&mut b, &choices);
            prop_assert_eq!(a.state().state_hash(), b.state().state_hash());
            prop_assert!(Replay::record(&a).unwrap().verify().unwrap());
        }

        #[test]
        fn prop_moves_never_land_on_friends(position in arb_position(24)) {
            for piece in position.pieces() {
                for mv in legal_moves(&position, piece.id) {
                    prop_assert_eq!(position.square_of(piece.id), Some(mv.from));
                    if let Some(target) = position.occupant(mv.to) {
                        prop_assert_ne!(target.color, piece.color);
                    }
                }
            }
        }

        #[test]
        fn prop_clone_is_independent(choices in arb_move_choices(40), to in arb_square()) {
            let mut game = Match::new();
            apply_choices(&mut game, &choices);
            let original = game.state().clone();
            let mut copy = clone_state(&original);

            let first_piece = copy.pieces().next().map(|p| p.id);
            if let Some(piece) = first_piece {
                move_piece(&mut copy, piece, to).unwrap();
            }
            copy.push_log("scratch");
            copy.turn = copy.turn.opponent();

            prop_assert_eq!(game.state(), &original);
            prop_assert_ne!(copy.state_hash(), original.state_hash());
        }

        #[test]
        fn prop_custom_tables_validate(table in arb_stat_table()) {
            prop_assert!(table.validate().is_ok());
            let game = Match::with_stats(table.clone());
            let king = game.state().occupant(sq("e1")).unwrap();
            prop_assert_eq!(king.hp, table.king.hp);
            prop_assert_eq!(king.color, Color::White);
        }
    }
}
