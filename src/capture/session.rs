//! Capture session state machine.
//!
//! A session is either idle (no buffer) or collecting (buffer present,
//! possibly empty). Transitions are driven only by markers seen in the
//! incoming stream:
//!
//! ```text
//!   Idle       --start-->  Collecting   (new empty buffer)
//!   Collecting --start-->  Collecting   (previous buffer discarded)
//!   Collecting --sample--> Collecting   (appended)
//!   Collecting --end-->    Idle         (buffer handed out if non-empty)
//!   Idle       --sample/end--> Idle     (ignored)
//! ```

use super::frame::{classify, FrameKind};
use super::sample::{parse_sample, Sample, SampleParseError};

/// Whether an episode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Collecting,
}

/// Result of feeding one line to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A new episode began; `discarded` samples from an unfinished one were dropped
    Started { discarded: usize },
    /// A sample was buffered at `index`
    Appended { index: usize },
    /// A sample-candidate line inside an episode failed to parse
    Rejected(SampleParseError),
    /// A sample-candidate line arrived while idle
    OutsideEpisode,
    /// The episode finished with these samples, in arrival order
    Completed(Vec<Sample>),
    /// The episode finished without any samples
    EmptyEpisode,
    /// An end marker arrived while idle
    StrayEnd,
    /// The line had no structural meaning
    Unrecognized,
}

/// Owns the active episode buffer.
#[derive(Debug, Default)]
pub struct CaptureSession {
    buffer: Option<Vec<Sample>>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.buffer.is_some() {
            SessionState::Collecting
        } else {
            SessionState::Idle
        }
    }

    /// Number of samples buffered in the active episode.
    pub fn buffered(&self) -> usize {
        self.buffer.as_ref().map_or(0, Vec::len)
    }

    /// Classify a decoded line and apply the resulting transition.
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        match classify(line) {
            FrameKind::Start => {
                let discarded = self.buffer.replace(Vec::new()).map_or(0, |b| b.len());
                Outcome::Started { discarded }
            }
            FrameKind::End => match self.buffer.take() {
                Some(samples) if samples.is_empty() => Outcome::EmptyEpisode,
                Some(samples) => Outcome::Completed(samples),
                None => Outcome::StrayEnd,
            },
            FrameKind::SampleCandidate => match self.buffer.as_mut() {
                Some(buffer) => match parse_sample(line) {
                    Ok(sample) => {
                        buffer.push(sample);
                        Outcome::Appended {
                            index: buffer.len() - 1,
                        }
                    }
                    Err(e) => Outcome::Rejected(e),
                },
                None => Outcome::OutsideEpisode,
            },
            FrameKind::Unrecognized => Outcome::Unrecognized,
        }
    }

    /// Drop any active episode, returning to idle. Returns the samples lost.
    pub fn abort(&mut self) -> usize {
        self.buffer.take().map_or(0, |b| b.len())
    }
}
