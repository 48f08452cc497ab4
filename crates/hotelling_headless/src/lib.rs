//! Headless session runner for scripted play and CI verification.
//!
//! This crate drives a [`hotelling_core::engine::Engine`] without any
//! presentation layer. A controller sends JSON commands on stdin and reads
//! session outcomes on stdout. This enables:
//!
//! - **Scripted play**: a bot or test harness can play full sessions
//! - **Batch statistics**: many seeded sessions with random placements
//! - **Determinism checks**: the same seed must always end in the same state
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from controller (place, confirm, next_round, etc.)
//! - **stdout**: Responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See the [`protocol`] module for the command and response formats.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"place","x":2.0,"y":5.0}' | cargo run -p hotelling_headless
//!
//! # Run a session file
//! cargo run -p hotelling_headless -- run --config sessions/duel.ron
//!
//! # Verify determinism
//! cargo run -p hotelling_headless -- verify --seed 42 --runs 5
//! ```

pub mod batch;
pub mod protocol;
pub mod runner;
pub mod session_file;

pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use protocol::{Command, Response};
pub use runner::HeadlessRunner;
pub use session_file::{SessionFile, SessionFileError};
