//! Headless Hotelling session runner.
//!
//! This binary runs sessions without any presentation layer, controlled via
//! JSON on stdin/stdout. Designed for bots, CI testing, and determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p hotelling_headless
//!
//! # Interactive mode with a session file
//! cargo run -p hotelling_headless -- run --config sessions/duel.ron --seed 7
//!
//! # Run a batch of random-placement sessions
//! cargo run -p hotelling_headless -- batch --sessions 1000 --rounds 10 --output results/batch.json
//!
//! # Verify that a seed replays identically
//! cargo run -p hotelling_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hotelling_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::HeadlessRunner,
    session_file::SessionFile,
};

#[derive(Parser)]
#[command(name = "hotelling_headless")]
#[command(about = "Headless market-placement session runner for bots and CI")]
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
    /// Run a single interactive session
    Run {
        /// Session file (RON) to load
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the session file's seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a batch of sessions with random placements
    Batch {
        /// Session file (RON) with shared settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of sessions to run
        #[arg(short, long, default_value = "100")]
        sessions: u32,

        /// Rounds per session
        #[arg(short, long, default_value = "10")]
        rounds: u32,

        /// Maximum parallel sessions (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Output file for results
        #[arg(short, long, default_value = "results/batch_results.json")]
        output: PathBuf,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Session file (RON) to test
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(long, default_value = "5")]
        runs: u32,

        /// Rounds per run
        #[arg(long, default_value = "10")]
        rounds: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run { config, seed }) => cmd_run(config, seed),
        Some(Commands::Batch {
            config,
            sessions,
            rounds,
            parallel,
            seed,
            output,
        }) => cmd_batch(config, sessions, rounds, parallel, seed, output),
        Some(Commands::Verify {
            config,
            seed,
            runs,
            rounds,
        }) => cmd_verify(config, seed, runs, rounds),
        None => {
            // Default: interactive mode
            cmd_run(None, None);
        }
    }
}

/// Load a session file, or the default session when none is given.
fn load_session(path: Option<PathBuf>) -> SessionFile {
    let Some(path) = path else {
        return SessionFile::default();
    };
    match SessionFile::load(&path) {
        Ok(session) => {
            tracing::info!(path = %path.display(), "Loaded session file");
            session
        }
        Err(e) => {
            eprintln!("Failed to load session file: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run a single interactive session
fn cmd_run(config: Option<PathBuf>, seed: Option<u64>) {
    let mut session = load_session(config);
    if let Some(seed) = seed {
        session.seed = seed;
    }

    tracing::info!(
        players = session.players,
        customers = session.customers,
        seed = session.seed,
        "Starting interactive session"
    );

    let mut runner = match HeadlessRunner::new(&session) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Invalid session: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runner.run(io::stdin().lock(), io::stdout().lock()) {
        tracing::error!(error = %e, "Protocol IO failed");
        std::process::exit(1);
    }
}

/// Run batch of sessions
fn cmd_batch(
    config: Option<PathBuf>,
    sessions: u32,
    rounds: u32,
    parallel: u32,
    seed: u64,
    output: PathBuf,
) {
    let session = load_session(config);

    let batch = BatchConfig {
        session: session.config(),
        session_count: sessions,
        rounds,
        seed_start: seed,
        parallel_sessions: parallel,
    };

    let results = run_batch(batch);

    if let Err(e) = results.save(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {}", e);
        std::process::exit(1);
    }

    // Print summary
    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Sessions played: {}", summary.total_sessions);
    if !results.errors.is_empty() {
        eprintln!("Sessions FAILED: {}", results.errors.len());
    }
    eprintln!("Rounds played: {}", summary.total_rounds);
    eprintln!("Tied rounds: {}", summary.tied_rounds);
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("\nRound win rates:");
    for (player, rate) in summary.round_win_rates().iter().enumerate() {
        eprintln!("  Player {}: {:.1}%", player + 1, rate * 100.0);
    }

    if !results.errors.is_empty() {
        eprintln!("\nSESSION FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Session {} (seed {}): {}",
                error.session_index, error.seed, error.message
            );
        }
    }

    eprintln!("\nResults saved to: {}", output.display());
}

/// Verify determinism
fn cmd_verify(config: Option<PathBuf>, seed: u64, runs: u32, rounds: u32) {
    let session = load_session(config);

    tracing::info!(
        "Verifying determinism: seed {} ({} runs of {} rounds)",
        seed,
        runs,
        rounds
    );

    if verify_determinism(&session.config(), rounds, seed, runs) {
        eprintln!("PASS: All {} runs produced identical results", runs);
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
}
