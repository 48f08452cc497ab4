//! Batch session runner for placement statistics.
//!
//! Runs many seeded sessions in parallel using rayon. Every player places
//! uniformly at random each round, which makes the batch a cheap fuzz of the
//! engine and a baseline for how often each seat wins by chance.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use hotelling_core::components::PlayerId;
use hotelling_core::config::SessionConfig;
use hotelling_core::engine::Engine;
use hotelling_core::error::EngineError;
use hotelling_core::math::MapPoint;
use hotelling_core::round::Phase;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Session settings shared by every run
    pub session: SessionConfig,
    /// Number of sessions to run
    pub session_count: u32,
    /// Rounds per session (a session round limit may stop it earlier)
    pub rounds: u32,
    /// Seed of the first session; session `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Maximum parallel sessions (0 = use rayon default)
    pub parallel_sessions: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            session_count: 100,
            rounds: 10,
            seed_start: 0,
            parallel_sessions: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for `session_count` sessions of `rounds` rounds
    pub fn new(session_count: u32, rounds: u32) -> Self {
        Self {
            session_count,
            rounds,
            ..Default::default()
        }
    }

    /// Set session settings
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Outcome of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Seed used
    pub seed: u64,
    /// Rounds actually played
    pub rounds_played: u32,
    /// Rounds won per player
    pub scores: Vec<u32>,
    /// Rounds without a unique winner
    pub tied_rounds: u32,
    /// Rounds where no customer could be assigned
    pub degenerate_rounds: u32,
    /// Player with the most round wins, if unique
    pub winner: Option<u32>,
    /// Engine state hash at the end
    pub final_state_hash: u64,
}

/// Aggregate statistics across a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Sessions completed
    pub total_sessions: u32,
    /// Rounds played across all sessions
    pub total_rounds: u64,
    /// Rounds won per player
    pub rounds_won: Vec<u64>,
    /// Rounds without a unique winner
    pub tied_rounds: u64,
    /// Sessions won per player
    pub sessions_won: Vec<u32>,
    /// Sessions without a unique winner
    pub tied_sessions: u32,
}

impl BatchSummary {
    /// Aggregate session metrics for `player_count` players.
    pub fn from_sessions(sessions: &[SessionMetrics], player_count: u32) -> Self {
        let seats = player_count as usize;
        let mut summary = Self {
            rounds_won: vec![0; seats],
            sessions_won: vec![0; seats],
            ..Default::default()
        };

        for session in sessions {
            summary.total_sessions += 1;
            summary.total_rounds += u64::from(session.rounds_played);
            summary.tied_rounds += u64::from(session.tied_rounds);
            for (won, &score) in summary.rounds_won.iter_mut().zip(&session.scores) {
                *won += u64::from(score);
            }
            match session.winner {
                Some(w) => {
                    if let Some(count) = summary.sessions_won.get_mut(w as usize) {
                        *count += 1;
                    }
                }
                None => summary.tied_sessions += 1,
            }
        }

        summary
    }

    /// Share of decided rounds won by each player.
    pub fn round_win_rates(&self) -> Vec<f64> {
        let decided: u64 = self.rounds_won.iter().sum();
        self.rounds_won
            .iter()
            .map(|&won| won as f64 / decided.max(1) as f64)
            .collect()
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual session metrics
    pub sessions: Vec<SessionMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Session index
    pub session_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

fn random_point<R: Rng>(rng: &mut R, config: &SessionConfig) -> Option<MapPoint> {
    let x = rng.gen_range(0.0..=config.map_width);
    let y = rng.gen_range(0.0..=config.map_height);
    MapPoint::from_f64(x, y)
}

/// Play one seeded session with random placements.
///
/// The engine's customer RNG and the placement RNG are both derived from
/// `seed`, so the same seed always replays the same session.
pub fn run_single_session(
    config: &SessionConfig,
    rounds: u32,
    seed: u64,
) -> Result<SessionMetrics, EngineError> {
    let mut placement_rng = StdRng::seed_from_u64(seed);
    let mut engine = Engine::new(config.clone(), StdRng::seed_from_u64(placement_rng.gen()))?;

    let mut tied_rounds = 0;
    let mut degenerate_rounds = 0;

    for round in 0..rounds {
        if round > 0 {
            engine.advance_from_results()?;
        }

        for player in 0..config.player_count {
            if let Some(position) = random_point(&mut placement_rng, config) {
                engine.place_product(PlayerId(player), position)?;
            }
            engine.confirm_placement()?;
        }

        if let Some(report) = engine.last_report() {
            if report.is_tie() {
                tied_rounds += 1;
            }
            if report.degenerate {
                degenerate_rounds += 1;
            }
        }

        if engine.phase() == Phase::GameOver {
            debug!(seed, round, "round limit reached");
            break;
        }
    }

    Ok(SessionMetrics {
        seed,
        rounds_played: engine.completed_rounds(),
        scores: engine.scoreboard().scores().to_vec(),
        tied_rounds,
        degenerate_rounds,
        winner: engine.scoreboard().leader().map(PlayerId::index),
        final_state_hash: engine.state_hash(),
    })
}

/// Size rayon's global pool. Returns `false` if the pool was already
/// running, in which case its existing size is kept.
pub fn configure_thread_pool(threads: u32) -> bool {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads as usize)
        .build_global()
    {
        Ok(()) => {
            debug!(threads, "global thread pool configured");
            true
        }
        Err(e) => {
            warn!(
                requested = threads,
                current = rayon::current_num_threads(),
                error = %e,
                "global thread pool already initialised, keeping its size"
            );
            false
        }
    }
}

/// Run a batch of sessions
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        sessions = config.session_count,
        rounds = config.rounds,
        players = config.session.player_count,
        seed = config.seed_start,
        "Starting batch run"
    );

    if config.parallel_sessions > 0 {
        configure_thread_pool(config.parallel_sessions);
    }

    let results: Vec<Result<SessionMetrics, BatchError>> = (0..config.session_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            match run_single_session(&config.session, config.rounds, seed) {
                Ok(metrics) => {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % 100 == 0 {
                        debug!("Progress: {}/{}", done, config.session_count);
                    }
                    Ok(metrics)
                }
                Err(e) => {
                    warn!("Session {} failed: {}", i, e);
                    Err(BatchError {
                        session_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (sessions, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let sessions: Vec<SessionMetrics> = sessions.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_sessions(&sessions, config.session.player_count);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} sessions in {:.1}s ({:.1} sessions/sec)",
        sessions.len(),
        duration_seconds,
        sessions.len() as f64 / duration_seconds.max(0.001)
    );

    BatchResults {
        config,
        sessions,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by running the same seed multiple times.
///
/// Returns `false` if any run ends in a different state or fails.
pub fn verify_determinism(config: &SessionConfig, rounds: u32, seed: u64, runs: u32) -> bool {
    let hashes: Vec<Option<u64>> = (0..runs)
        .map(|_| {
            run_single_session(config, rounds, seed)
                .map(|m| m.final_state_hash)
                .ok()
        })
        .collect();

    match hashes.first() {
        Some(Some(first)) => hashes.iter().all(|h| *h == Some(*first)),
        Some(None) => false,
        None => true,
    }
}
