//! Paceline CLI - Command-line interface for the analysis engine
//!
//! Commands:
//! - summarize: classify an activity stream and print its summary
//! - validate: check an activity stream against the input invariants

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use paceline::{ActivityAnalyzer, ActivityStream, AnalysisConfig, ENGINE_VERSION};

/// Paceline - classify runner telemetry into base and interval summaries
#[derive(Parser)]
#[command(name = "paceline")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Summarize runner activity telemetry", long_about = None)]
struct Cli {
    /// Emit analysis diagnostics on stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an activity stream and print its summary as JSON
    Summarize {
        /// Input file with a JSON activity stream (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Smoothing kernel width in samples
        #[arg(long)]
        kernel_width: Option<usize>,

        /// PELT penalty per change point
        #[arg(long)]
        segment_penalty: Option<f64>,

        /// Pretty-print the summary JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Check an activity stream against the input invariants
    Validate {
        /// Input file with a JSON activity stream (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn read_input(path: &PathBuf) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
    }
}

fn load_stream(path: &PathBuf) -> Result<ActivityStream, String> {
    let raw = read_input(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("failed to parse activity stream: {e}"))
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Summarize {
            input,
            kernel_width,
            segment_penalty,
            pretty,
        } => {
            let stream = load_stream(&input)?;
            let mut config = AnalysisConfig::default();
            if let Some(width) = kernel_width {
                config.kernel_width = width;
            }
            if let Some(penalty) = segment_penalty {
                config.segment_penalty = penalty;
            }
            let analyzer = ActivityAnalyzer::new(config);
            let summary = analyzer.summarize(&stream).map_err(|e| e.to_string())?;
            let json = if pretty {
                serde_json::to_string_pretty(&summary)
            } else {
                serde_json::to_string(&summary)
            }
            .map_err(|e| e.to_string())?;
            println!("{json}");
            Ok(())
        }
        Commands::Validate { input } => {
            let stream = load_stream(&input)?;
            stream.validate().map_err(|e| e.to_string())?;
            println!("{{\"valid\":true,\"samples\":{}}}", stream.len());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(io::stderr)
            .init();
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!(
                "{}",
                serde_json::json!({ "error": message })
            );
            ExitCode::FAILURE
        }
    }
}
