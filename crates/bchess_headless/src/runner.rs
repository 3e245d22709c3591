//! Headless match runner.
//!
//! [`HeadlessRunner`] owns one [`Match`] and answers protocol commands
//! against it. [`HeadlessRunner::handle`] is pure request/response, so tests
//! drive it directly; [`HeadlessRunner::run`] wraps it in a line loop over
//! any reader and writer.

use std::io::{BufRead, Write};

use bchess_core::error::GameError;
use bchess_core::movegen::legal_moves_from;
use bchess_core::session::Match;
use bchess_core::square::Square;
use bchess_core::stats::StatTable;

use crate::ascii_board::{render_board, BoardConfig};
use crate::error::Result;
use crate::protocol::{Command, PieceState, Response, StatRow};

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Stat table every new match starts with.
    pub stats: StatTable,
    /// Follow every applied move with a full state snapshot.
    pub auto_state: bool,
}

/// Runner for protocol-driven play.
#[derive(Debug)]
pub struct HeadlessRunner {
    config: RunnerConfig,
    game: Match,
    finished: bool,
}

impl HeadlessRunner {
    /// Create a new runner with the canonical stat table.
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a runner with custom configuration.
    pub fn with_config(config: RunnerConfig) -> Self {
        let game = Match::with_stats(config.stats.clone());
        Self {
            config,
            game,
            finished: false,
        }
    }

    /// The match being played.
    pub const fn game(&self) -> &Match {
        &self.game
    }

    /// Whether `quit` has been received.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Answer one command.
    ///
    /// Engine errors become [`Response::Error`]; the session keeps going.
    pub fn handle(&mut self, cmd: Command) -> Vec<Response> {
        let name = cmd.name();
        match self.dispatch(cmd) {
            Ok(responses) => responses,
            Err(e) => {
                tracing::warn!(cmd = name, error = %e, "Command rejected");
                vec![Response::error(e.to_string(), Some(name))]
            }
        }
    }

    fn dispatch(&mut self, cmd: Command) -> std::result::Result<Vec<Response>, GameError> {
        let name = cmd.name();
        let responses = match cmd {
            Command::New => {
                self.game = Match::with_stats(self.config.stats.clone());
                tracing::info!("Started new match");
                vec![Response::ack(name)]
            }
            Command::Select { square } => {
                let square = parse_square(&square)?;
                let moves = self.game.select_at(square)?;
                vec![Response::Legal {
                    square,
                    moves: moves.iter().map(|m| m.to).collect(),
                }]
            }
            Command::Legal { square } => {
                let square = parse_square(&square)?;
                let moves = legal_moves_from(self.game.state(), square);
                vec![Response::Legal {
                    square,
                    moves: moves.iter().map(|m| m.to).collect(),
                }]
            }
            Command::Move { from, to } => {
                let report = self
                    .game
                    .play_move(parse_square(&from)?, parse_square(&to)?)?;
                let mut out = vec![Response::Turn { report }];
                if self.config.auto_state {
                    out.push(self.state_response());
                }
                out
            }
            Command::Query => vec![self.state_response()],
            Command::Board { hp } => {
                let config = BoardConfig {
                    show_hp: hp,
                    ..BoardConfig::default()
                };
                vec![Response::Board {
                    text: render_board(self.game.state(), &config),
                }]
            }
            Command::Stats => vec![Response::Stats {
                entries: StatRow::table(self.game.state().stats()),
            }],
            Command::Hash => vec![Response::StateHash {
                moves: self.game.history().len(),
                hash: self.game.state().state_hash(),
            }],
            Command::Flip => {
                self.game.flip_board();
                vec![Response::ack(name)]
            }
            Command::Quit => {
                self.finished = true;
                vec![Response::Bye]
            }
        };
        Ok(responses)
    }

    /// Full state snapshot.
    pub fn state_response(&self) -> Response {
        let state = self.game.state();
        Response::State {
            turn: state.turn,
            over: state.over,
            status: state.status.clone(),
            position: state.display_position(),
            pieces: state
                .occupied()
                .filter_map(|(sq, id)| state.piece(id).map(|p| PieceState::new(p, sq)))
                .collect(),
            log: state.log().to_vec(),
            hash: state.state_hash(),
        }
    }

    /// Run the protocol loop until `quit` or end of input.
    ///
    /// Reads JSON commands from `input`, writes responses to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading or writing fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        write_response(&mut output, &Response::ready(self.game.state().turn))?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let responses = match Command::from_json(line) {
                Ok(cmd) => {
                    tracing::debug!(cmd = cmd.name(), "Received command");
                    self.handle(cmd)
                }
                Err(e) => vec![Response::error(format!("Parse error: {e}"), None)],
            };
            for response in &responses {
                write_response(&mut output, response)?;
            }

            if self.finished {
                return Ok(());
            }
        }

        self.finished = true;
        write_response(&mut output, &Response::Bye)?;
        Ok(())
    }
}

impl Default for HeadlessRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_square(text: &str) -> std::result::Result<Square, GameError> {
    text.parse()
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bchess_core::combat::CombatOutcome;
    use bchess_core::piece::Color;

    fn mv(from: &str, to: &str) -> Command {
        Command::Move {
            from: from.into(),
            to: to.into(),
        }
    }

    #[test]
    fn test_select_lists_destinations() {
        let mut runner = HeadlessRunner::new();
        let out = runner.handle(Command::Select {
            square: "g1".into(),
        });
        assert_eq!(
            out,
            vec![Response::Legal {
                square: "g1".parse().unwrap(),
                moves: vec!["f3".parse().unwrap(), "h3".parse().unwrap()],
            }]
        );
        assert!(runner.game().selected().is_some());
    }

    #[test]
    fn test_move_reports_turn() {
        let mut runner = HeadlessRunner::new();
        let out = runner.handle(mv("d2", "d3"));
        let [Response::Turn { report }] = out.as_slice() else {
            panic!("expected a turn response, got {out:?}");
        };
        assert_eq!(report.outcome, CombatOutcome::Move);
        assert_eq!(runner.game().state().turn, Color::Black);
        assert!(out[0]
            .to_json_line()
            .contains(r#""outcome":{"type":"move","damage":0}"#));
    }

    #[test]
    fn test_errors_name_the_command() {
        let mut runner = HeadlessRunner::new();
        let out = runner.handle(mv("d7", "d6"));
        assert!(matches!(
            out.as_slice(),
            [Response::Error { cmd: Some(cmd), .. }] if cmd == "move"
        ));

        let out = runner.handle(Command::Legal {
            square: "z9".into(),
        });
        assert!(matches!(out.as_slice(), [Response::Error { .. }]));
    }

    #[test]
    fn test_auto_state_follows_moves() {
        let mut runner = HeadlessRunner::with_config(RunnerConfig {
            auto_state: true,
            ..RunnerConfig::default()
        });
        let out = runner.handle(mv("e2", "e3"));
        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], Response::State { turn: Color::Black, .. }));
    }

    #[test]
    fn test_new_resets_match() {
        let mut runner = HeadlessRunner::new();
        runner.handle(mv("e2", "e3"));
        assert_eq!(runner.handle(Command::New), vec![Response::ack("new")]);
        assert!(runner.game().history().is_empty());
    }

    #[test]
    fn test_run_loop_over_buffers() {
        let input = concat!(
            "{\"cmd\":\"move\",\"from\":\"d2\",\"to\":\"d3\"}\n",
            "\n",
            "garbage\n",
            "{\"cmd\":\"hash\"}\n",
            "{\"cmd\":\"quit\"}\n",
            "{\"cmd\":\"query\"}\n",
        );
        let mut output = Vec::new();
        let mut runner = HeadlessRunner::new();
        runner.run(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains(r#""type":"ready""#));
        assert!(lines[1].contains(r#""type":"turn""#));
        assert!(lines[2].contains("Parse error"));
        assert!(lines[3].contains(r#""type":"state_hash""#));
        assert_eq!(lines[4], r#"{"type":"bye"}"#);
        assert!(runner.is_finished());
    }

    #[test]
    fn test_end_of_input_says_bye() {
        let mut output = Vec::new();
        HeadlessRunner::new().run(&b""[..], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with("{\"type\":\"bye\"}\n"));
    }
}
