//! ASCII board renderer.
//!
//! Draws a position as text for terminals and protocol clients:
//!
//! ```text
//!   +------------------------+
//! 8 | r  n  b  q  k  b  n  r |
//! 7 | p  p  p  p  p  p  p  p |
//! 6 | .  .  .  .  .  .  .  . |
//!   ...
//! 1 | R  N  B  Q  K  B  N  R |
//!   +------------------------+
//!     a  b  c  d  e  f  g  h
//! ```
//!
//! Uppercase letters are White, lowercase Black. With `show_hp` each piece
//! carries its remaining hit points (`P3`, `k10`).

use bchess_core::movegen::legal_moves;
use bchess_core::piece::{Color, Piece};
use bchess_core::square::{Square, BOARD_SIZE};
use bchess_core::state::GameState;

/// Board rendering configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Append remaining hp to each piece letter.
    pub show_hp: bool,
    /// Mark empty squares the selected piece can move to with `*`.
    pub show_targets: bool,
    /// Add a line with the side to move or the final status.
    pub show_status: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            show_hp: false,
            show_targets: true,
            show_status: true,
        }
    }
}

fn piece_label(piece: &Piece, show_hp: bool) -> String {
    let letter = match piece.color {
        Color::White => piece.kind.code(),
        Color::Black => piece.kind.code().to_ascii_lowercase(),
    };
    if show_hp {
        format!("{letter}{}", piece.hp)
    } else {
        letter.to_string()
    }
}

/// Render the board, honoring the state's orientation flag.
///
/// Unflipped boards put rank 8 at the top and the a-file on the left;
/// flipped boards put rank 1 at the top and the h-file on the left.
pub fn render_board(state: &GameState, config: &BoardConfig) -> String {
    let width = if config.show_hp { 4 } else { 3 };
    let (ranks, files): (Vec<u8>, Vec<u8>) = if state.flipped {
        ((0..BOARD_SIZE).collect(), (0..BOARD_SIZE).rev().collect())
    } else {
        ((0..BOARD_SIZE).rev().collect(), (0..BOARD_SIZE).collect())
    };

    let targets: Vec<Square> = match (config.show_targets, state.selected) {
        (true, Some(id)) => legal_moves(state, id).into_iter().map(|m| m.to).collect(),
        _ => Vec::new(),
    };

    let border = format!("  +{}+\n", "-".repeat(width * usize::from(BOARD_SIZE)));
    let mut out = String::new();
    out.push_str(&border);

    for &rank in &ranks {
        out.push_str(&format!("{} |", rank + 1));
        for &file in &files {
            let Some(square) = Square::new(file, rank) else {
                continue;
            };
            let cell = match state.occupant(square) {
                Some(piece) => piece_label(piece, config.show_hp),
                None if targets.contains(&square) => "*".to_string(),
                None => ".".to_string(),
            };
            out.push_str(&format!("{cell:^width$}"));
        }
        out.push_str("|\n");
    }

    out.push_str(&border);
    out.push_str("   ");
    for &file in &files {
        let label = Square::new(file, 0).map_or(' ', |sq| sq.file_char());
        out.push_str(&format!("{label:^width$}"));
    }
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('\n');

    if config.show_status {
        let status = state
            .status
            .clone()
            .unwrap_or_else(|| format!("{} to move", state.turn));
        out.push_str(&status);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bchess_core::state::create_initial_state;

    fn plain() -> BoardConfig {
        BoardConfig {
            show_hp: false,
            show_targets: false,
            show_status: false,
        }
    }

    #[test]
    fn test_initial_board() {
        let text = render_board(&create_initial_state(), &plain());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "  +------------------------+");
        assert_eq!(lines[1], "8 | r  n  b  q  k  b  n  r |");
        assert_eq!(lines[2], "7 | p  p  p  p  p  p  p  p |");
        assert_eq!(lines[3], "6 | .  .  .  .  .  .  .  . |");
        assert_eq!(lines[8], "1 | R  N  B  Q  K  B  N  R |");
        assert_eq!(lines[10], "    a  b  c  d  e  f  g  h");
    }

    #[test]
    fn test_flipped_board() {
        let mut state = create_initial_state();
        state.flipped = true;
        let text = render_board(&state, &plain());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "1 | R  N  B  K  Q  B  N  R |");
        assert_eq!(lines[8], "8 | r  n  b  k  q  b  n  r |");
        assert_eq!(lines[10], "    h  g  f  e  d  c  b  a");
    }

    #[test]
    fn test_hp_and_status() {
        let config = BoardConfig {
            show_hp: true,
            ..plain()
        };
        let text = render_board(&create_initial_state(), &config);
        assert!(text.lines().nth(1).unwrap().contains("k10"));
        assert!(text.lines().nth(7).unwrap().contains("P3"));

        let text = render_board(&create_initial_state(), &BoardConfig::default());
        assert!(text.ends_with("White to move\n"));
    }

    #[test]
    fn test_selected_targets_are_marked() {
        let mut state = create_initial_state();
        state.selected = state.piece_at("g1".parse().unwrap());
        let text = render_board(&state, &BoardConfig::default());
        assert_eq!(text.lines().nth(6).unwrap(), "3 | .  .  .  .  .  *  .  * |");
    }
}
