//! Core capture functionality.
//!
//! This module contains:
//! - Frame classification of decoded lines (start/end markers, samples)
//! - Sample parsing into 3-axis readings
//! - The capture session state machine that owns the active episode
//! - Record building and CSV persistence
//! - Operator command relay to the device

pub mod frame;
pub mod record;
pub mod relay;
pub mod sample;
pub mod session;

// Re-export commonly used types
pub use frame::{classify, FrameKind, END_MARKER, START_MARKER};
pub use record::{Record, RecordWriter, TimedSample, WrittenRecord, CSV_HEADER, SAMPLE_INTERVAL_MS};
pub use relay::{Command, CommandRelay};
pub use sample::{parse_sample, Sample, SampleParseError};
pub use session::{CaptureSession, Outcome, SessionState};
