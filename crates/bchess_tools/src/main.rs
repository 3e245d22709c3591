//! Battle Chess - Development Tools

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bchess_core::stats::StatTable;

#[derive(Parser)]
#[command(name = "bchess-tools")]
#[command(about = "Development tools for Battle Chess")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate stat table files
    Validate {
        /// Data file or directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },

    /// Write the built-in stat table as RON
    Export {
        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {}", path.display());
            match bchess_tools::validate::validate_data_directory(&path) {
                Ok(report) if report.is_ok() => {
                    tracing::info!(files = report.valid_count(), "Validation passed");
                    ExitCode::SUCCESS
                }
                Ok(report) => {
                    for file in report.invalid() {
                        if let Some(e) = &file.error {
                            eprintln!("{}: {e}", file.path.display());
                        }
                    }
                    tracing::error!(
                        valid = report.valid_count(),
                        total = report.files.len(),
                        "Validation failed"
                    );
                    ExitCode::FAILURE
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Export { output } => {
            let text = match StatTable::default().to_ron_string() {
                Ok(text) => text + "\n",
                Err(e) => {
                    tracing::error!("Export failed: {e}");
                    return ExitCode::FAILURE;
                }
            };
            match output {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, text) {
                        tracing::error!(path = %path.display(), "Export failed: {e}");
                        return ExitCode::FAILURE;
                    }
                    tracing::info!(path = %path.display(), "Wrote stat table");
                }
                None => print!("{text}"),
            }
            ExitCode::SUCCESS
        }
    }
}
