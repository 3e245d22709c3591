//! Headless battle chess runner.
//!
//! Plays matches without a graphical board, controlled via JSON on
//! stdin/stdout. Designed for scripted controllers, CI, and replay checks.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p bchess_headless
//!
//! # Play a fixed move list and print the board
//! cargo run -p bchess_headless -- play d2d3 e7e6 d1d2 --hp
//!
//! # Inspect a stat table
//! cargo run -p bchess_headless -- stats --file assets/data/piece_stats.ron --format json
//!
//! # Verify a recorded replay
//! cargo run -p bchess_headless -- verify opening.replay
//! ```
//!
//! Logs go to stderr so stdout stays clean for the protocol.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bchess_core::replay::Replay;
use bchess_headless::{
    format_stats, load_stat_table, play_script, render_board, verify_replay, BoardConfig,
    HeadlessRunner, Result, RunnerConfig, StatsFormat,
};

#[derive(Parser)]
#[command(name = "bchess_headless")]
#[command(about = "Headless battle chess runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive JSON-lines session
    Run {
        /// Stat table (RON) for every match in the session
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Output the full state after every move
        #[arg(long)]
        auto_state: bool,
    },

    /// Play a list of moves from the standard setup
    Play {
        /// Moves in coordinate form (d2d3 or d2-d3)
        #[arg(required = true)]
        moves: Vec<String>,

        /// Stat table (RON) to play with
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Save the finished match as a replay
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Show remaining hp on the board
        #[arg(long)]
        hp: bool,
    },

    /// Print a stat table
    Stats {
        /// Stat table (RON); the built-in table if omitted
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = StatsFormat::Table)]
        format: StatsFormat,
    },

    /// Verify that a replay reaches its recorded final position
    Verify {
        /// Replay file path
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run { stats, auto_state }) => cmd_run(stats.as_deref(), auto_state),
        Some(Commands::Play {
            moves,
            stats,
            replay,
            hp,
        }) => cmd_play(&moves, stats.as_deref(), replay.as_deref(), hp),
        Some(Commands::Stats { file, format }) => cmd_stats(file.as_deref(), format),
        Some(Commands::Verify { file }) => cmd_verify(&file),
        None => cmd_run(None, false),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

/// Run an interactive session on stdin/stdout
fn cmd_run(stats: Option<&Path>, auto_state: bool) -> Result<()> {
    tracing::info!("Starting interactive session");

    let config = RunnerConfig {
        stats: load_stat_table(stats)?,
        auto_state,
    };
    let mut runner = HeadlessRunner::with_config(config);
    runner.run(io::stdin().lock(), io::stdout().lock())
}

/// Play scripted moves and print the log and final board
fn cmd_play(moves: &[String], stats: Option<&Path>, replay: Option<&Path>, hp: bool) -> Result<()> {
    let game = play_script(moves, load_stat_table(stats)?)?;

    for line in game.state().log() {
        println!("{line}");
    }
    println!();
    let config = BoardConfig {
        show_hp: hp,
        ..BoardConfig::default()
    };
    print!("{}", render_board(game.state(), &config));

    if let Some(path) = replay {
        Replay::record(&game)?.save(path)?;
        tracing::info!(path = %path.display(), moves = game.history().len(), "Saved replay");
    }
    Ok(())
}

/// Print a stat table
fn cmd_stats(file: Option<&Path>, format: StatsFormat) -> Result<()> {
    let table = load_stat_table(file)?;
    print!("{}", format_stats(&table, format)?);
    Ok(())
}

/// Verify a replay
fn cmd_verify(file: &Path) -> Result<()> {
    let hash = verify_replay(file)?;
    eprintln!("PASS: Replay verification successful");
    eprintln!("  Final hash: {hash:016x}");
    Ok(())
}
