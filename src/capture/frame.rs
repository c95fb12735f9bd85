//! Frame classification for decoded device lines.
//!
//! Markers are matched as substrings so that device log noise on the same
//! line does not hide them, and they are checked before any numeric parsing
//! since the start marker itself contains commas.

/// Line fragment the device prints when a capture begins.
pub const START_MARKER: &str = "-,-,-";

/// Line fragment the device prints when a capture ends.
pub const END_MARKER: &str = "Capture complete";

/// Structural role of one line in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Begins a new episode
    Start,
    /// Ends the active episode
    End,
    /// Contains a comma; may parse as a sample
    SampleCandidate,
    /// Anything else
    Unrecognized,
}

/// Classify a decoded line. First match wins: start, end, sample, other.
pub fn classify(line: &str) -> FrameKind {
    if line.contains(START_MARKER) {
        FrameKind::Start
    } else if line.contains(END_MARKER) {
        FrameKind::End
    } else if line.contains(',') {
        FrameKind::SampleCandidate
    } else {
        FrameKind::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_match_as_substrings() {
        assert_eq!(classify("-,-,-"), FrameKind::Start);
        assert_eq!(classify("[12] -,-,- begin"), FrameKind::Start);
        assert_eq!(classify("Capture complete"), FrameKind::End);
        assert_eq!(classify("I (3021) Capture complete!"), FrameKind::End);
    }

    #[test]
    fn test_start_marker_wins_over_end_and_sample() {
        assert_eq!(classify("-,-,- Capture complete"), FrameKind::Start);
    }

    #[test]
    fn test_end_marker_wins_over_sample() {
        assert_eq!(classify("Capture complete, 120 samples"), FrameKind::End);
    }

    #[test]
    fn test_sample_candidates_and_noise() {
        assert_eq!(classify("1.0,2.0,3.0"), FrameKind::SampleCandidate);
        assert_eq!(classify("bad,line"), FrameKind::SampleCandidate);
        assert_eq!(classify("noise"), FrameKind::Unrecognized);
        assert_eq!(classify(""), FrameKind::Unrecognized);
        assert_eq!(classify("capture complete"), FrameKind::Unrecognized);
    }
}
