//! Run statistics with optional cumulative persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Counters for the current run.
#[derive(Debug)]
pub struct CaptureStats {
    /// Identifier of this run
    run_id: Uuid,
    /// Decoded lines received from the device
    lines_received: AtomicU64,
    /// Lines dropped because they were not valid text or too long
    decode_failures: AtomicU64,
    /// Sample-candidate lines rejected inside an episode
    parse_failures: AtomicU64,
    /// Sample lines seen while no episode was active
    stray_samples: AtomicU64,
    /// Start markers seen
    episodes_started: AtomicU64,
    /// Samples thrown away by a restart or an interrupted episode
    samples_discarded: AtomicU64,
    /// Episodes that ended without samples
    empty_episodes: AtomicU64,
    /// Records persisted
    records_written: AtomicU64,
    /// Samples persisted across all records
    samples_written: AtomicU64,
    /// Records that could not be persisted
    write_failures: AtomicU64,
    /// Commands relayed to the device
    commands_sent: AtomicU64,
    /// Run start time
    run_start: DateTime<Utc>,
    /// Totals from earlier runs, loaded from disk
    previous: PersistedStats,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl CaptureStats {
    /// Create a new stats log.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            lines_received: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
            stray_samples: AtomicU64::new(0),
            episodes_started: AtomicU64::new(0),
            samples_discarded: AtomicU64::new(0),
            empty_episodes: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            samples_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            commands_sent: AtomicU64::new(0),
            run_start: Utc::now(),
            previous: PersistedStats::default(),
            persist_path: None,
        }
    }

    /// Create a stats log that adds to totals stored at `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();

        match Self::load(&path) {
            Ok(Some(previous)) => stats.previous = previous,
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not load previous capture stats: {}", e),
        }

        stats.persist_path = Some(path);
        stats
    }

    /// Identifier of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record a decoded line.
    pub fn record_line(&self) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a line dropped before decoding completed.
    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a malformed sample inside a capture.
    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a sample line seen outside a capture.
    pub fn record_stray_sample(&self) {
        self.stray_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a start marker; `discarded` samples came from an unfinished episode.
    pub fn record_episode_started(&self, discarded: usize) {
        self.episodes_started.fetch_add(1, Ordering::Relaxed);
        self.record_samples_discarded(discarded);
    }

    /// Record samples lost without being written.
    pub fn record_samples_discarded(&self, count: usize) {
        self.samples_discarded
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a capture that ended with no samples.
    pub fn record_empty_episode(&self) {
        self.empty_episodes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a persisted record of `samples` rows.
    pub fn record_written(&self, samples: usize) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.samples_written
            .fetch_add(samples as u64, Ordering::Relaxed);
    }

    /// Record a record that could not be persisted.
    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a command relayed to the device.
    pub fn record_command_sent(&self) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Counters for this run only.
    pub fn stats(&self) -> CaptureStatsSnapshot {
        CaptureStatsSnapshot {
            run_id: self.run_id,
            lines_received: self.lines_received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            stray_samples: self.stray_samples.load(Ordering::Relaxed),
            episodes_started: self.episodes_started.load(Ordering::Relaxed),
            samples_discarded: self.samples_discarded.load(Ordering::Relaxed),
            empty_episodes: self.empty_episodes.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            samples_written: self.samples_written.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            run_start: self.run_start,
            run_duration_secs: (Utc::now() - self.run_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Run Statistics ({}):\n\
             - Lines received: {}\n\
             - Undecodable lines dropped: {}\n\
             - Malformed samples dropped: {}\n\
             - Samples outside a capture: {}\n\
             - Captures started: {}\n\
             - Empty captures: {}\n\
             - Samples discarded: {}\n\
             - Records written: {} ({} samples)\n\
             - Record write failures: {}\n\
             - Commands sent: {}\n\
             - Run duration: {} seconds",
            stats.run_id,
            stats.lines_received,
            stats.decode_failures,
            stats.parse_failures,
            stats.stray_samples,
            stats.episodes_started,
            stats.empty_episodes,
            stats.samples_discarded,
            stats.records_written,
            stats.samples_written,
            stats.write_failures,
            stats.commands_sent,
            stats.run_duration_secs
        )
    }

    /// Totals across earlier runs plus this one.
    pub fn cumulative(&self) -> PersistedStats {
        let run = self.stats();
        PersistedStats {
            runs: self.previous.runs + 1,
            records_written: self.previous.records_written + run.records_written,
            samples_written: self.previous.samples_written + run.samples_written,
            empty_episodes: self.previous.empty_episodes + run.empty_episodes,
            write_failures: self.previous.write_failures + run.write_failures,
            decode_failures: self.previous.decode_failures + run.decode_failures,
            parse_failures: self.previous.parse_failures + run.parse_failures,
            last_updated: Some(Utc::now()),
        }
    }

    /// Save cumulative totals to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let json =
                serde_json::to_string_pretty(&self.cumulative()).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load cumulative totals written by an earlier run.
    pub fn load(path: &std::path::Path) -> Result<Option<PersistedStats>, std::io::Error> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let persisted = serde_json::from_str(&content).map_err(std::io::Error::other)?;
        Ok(Some(persisted))
    }
}

impl Default for CaptureStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the current run's counters.
#[derive(Debug, Clone)]
pub struct CaptureStatsSnapshot {
    pub run_id: Uuid,
    pub lines_received: u64,
    pub decode_failures: u64,
    pub parse_failures: u64,
    pub stray_samples: u64,
    pub episodes_started: u64,
    pub samples_discarded: u64,
    pub empty_episodes: u64,
    pub records_written: u64,
    pub samples_written: u64,
    pub write_failures: u64,
    pub commands_sent: u64,
    pub run_start: DateTime<Utc>,
    pub run_duration_secs: u64,
}

/// Totals kept across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedStats {
    pub runs: u64,
    pub records_written: u64,
    pub samples_written: u64,
    pub empty_episodes: u64,
    pub write_failures: u64,
    pub decode_failures: u64,
    pub parse_failures: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Thread-safe shared stats log.
pub type SharedCaptureStats = Arc<CaptureStats>;

/// Create a new shared stats log.
pub fn create_shared_stats() -> SharedCaptureStats {
    Arc::new(CaptureStats::new())
}

/// Create a new shared stats log with persistence.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedCaptureStats {
    Arc::new(CaptureStats::with_persistence(path))
}
