//! Capture statistics.
//!
//! Every recovered failure (undecodable line, rejected sample, empty
//! episode, failed write) is counted here so it stays observable after
//! the run, alongside the records produced.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_stats, create_shared_stats_with_persistence, CaptureStats, CaptureStatsSnapshot,
    PersistedStats, SharedCaptureStats,
};
