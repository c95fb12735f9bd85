//! Error types for the gesture capture tool.

use crate::config::ConfigError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a run or a single record write.
///
/// Per-line problems (undecodable bytes, malformed samples) never surface
/// here; they are reported as outcomes by the capture session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error while writing a record
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration could not be loaded or saved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No serial device could be auto-detected
    #[error("No capture device found; specify a port with --port")]
    NoDeviceFound,

    /// The transport stopped accepting or producing bytes
    #[error("Transport closed")]
    TransportClosed,

    /// A record was requested for an episode with no samples
    #[error("Cannot write an empty record")]
    EmptyRecord,
}
