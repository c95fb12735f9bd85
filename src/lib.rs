//! Gesture Capture - serial accelerometer episodes to timestamped CSV records.
//!
//! The capture board streams `x,y,z` accelerometer lines over a serial link
//! and brackets each gesture with a start marker (`-,-,-`) and an end
//! message (`Capture complete`). This library frames that stream into
//! episodes and writes every completed episode to its own CSV file with
//! synthetic timestamps at the board's fixed 100 Hz sample rate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Capture Runner                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐   ┌───────────┐   │
//! │  │ Transport │──▶│ Tokenizer │──▶│  Session  │──▶│  Record   │   │
//! │  │ (serial)  │   │  (lines)  │   │ (markers) │   │  Writer   │   │
//! │  └───────────┘   └───────────┘   └───────────┘   └───────────┘   │
//! │        ▲                               │                         │
//! │        │                               ▼                         │
//! │  ┌───────────┐                   ┌───────────┐                   │
//! │  │  Command  │◀── keys           │   Stats   │                   │
//! │  │   Relay   │                   │    Log    │                   │
//! │  └───────────┘                   └───────────┘                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use gesture_capture::capture::{CaptureSession, Outcome, Sample};
//!
//! let mut session = CaptureSession::new();
//! for line in ["-,-,-", "1.0,2.0,3.0", "bad,line"] {
//!     session.handle_line(line);
//! }
//!
//! match session.handle_line("Capture complete") {
//!     Outcome::Completed(samples) => assert_eq!(samples, vec![Sample::new(1.0, 2.0, 3.0)]),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod runner;
pub mod stats;
pub mod stream;

// Re-export key types at crate root for convenience
pub use capture::{CaptureSession, Record, RecordWriter, Sample, WrittenRecord};
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use runner::CaptureRunner;
pub use stats::{CaptureStats, SharedCaptureStats};
pub use stream::{MockTransport, SerialTransport, Transport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Operator key help shown when a capture run starts.
pub const CONTROLS_HELP: &str = r#"
╔══════════════════════════════════════════════════════════════╗
║                   GESTURE CAPTURE - CONTROLS                 ║
╠══════════════════════════════════════════════════════════════╣
║                                                              ║
║   o + Enter   send start command to the board                ║
║   p + Enter   send stop command to the board                 ║
║   Ctrl+C      stop the run and close the serial port         ║
║                                                              ║
║   A capture can also be started with the board's button.     ║
║   Each completed capture is saved as its own CSV file.       ║
║                                                              ║
╚══════════════════════════════════════════════════════════════╝
"#;
