//! Configuration for the gesture capture tool.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a capture run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Serial port path; `None` means auto-detect
    pub port: Option<String>,

    /// Serial baud rate
    pub baud_rate: u32,

    /// Gesture label encoded in record names
    pub gesture: String,

    /// Subject label encoded in record names
    pub person: String,

    /// Root directory for records; files land in `<output_dir>/<gesture>/`
    pub output_dir: PathBuf,

    /// Sleep between scheduler ticks
    #[serde(with = "millis_serde")]
    pub poll_interval: Duration,

    /// Wait after opening the port, the device resets on connect
    #[serde(with = "millis_serde")]
    pub settle_delay: Duration,

    /// Serial read timeout
    #[serde(with = "millis_serde")]
    pub read_timeout: Duration,

    /// Path for storing cumulative capture statistics
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gesture-capture");

        Self {
            port: None,
            baud_rate: 115_200,
            gesture: "gesture".to_string(),
            person: "user".to_string(),
            output_dir: PathBuf::from("data"),
            poll_interval: Duration::from_millis(10),
            settle_delay: Duration::from_secs(2),
            read_timeout: Duration::from_millis(100),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, falling back to defaults.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gesture-capture")
            .join("config.json")
    }

    /// Directory that receives records for the configured gesture.
    pub fn record_dir(&self) -> PathBuf {
        self.output_dir.join(&self.gesture)
    }

    /// Location of the cumulative statistics file.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("capture_stats.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(self.record_dir())?;
        std::fs::create_dir_all(&self.data_path)?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serde support for Duration as whole milliseconds.
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
