//! Records of completed episodes and their CSV persistence.
//!
//! A record pairs every sample with a synthetic timestamp derived from its
//! index (`index * SAMPLE_INTERVAL_MS`), since the device does not report time.
//! Each record is written to its own file named
//! `output_<gesture>_<person>_<n>_<YYYYmmdd_HHMMSS>.csv`.

use super::sample::Sample;
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

/// Header row of every record file.
pub const CSV_HEADER: [&str; 4] = ["timestamp", "x", "y", "z"];

/// Spacing between consecutive samples; the board samples at 100 Hz.
pub const SAMPLE_INTERVAL_MS: u64 = 10;

/// Upper bound on capture numbers tried when names collide.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// A sample with its synthetic offset from the episode start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSample {
    pub timestamp: u64,
    pub sample: Sample,
}

/// Immutable, ordered output of one completed episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    rows: Vec<TimedSample>,
}

impl Record {
    /// Build a record, or `None` for an empty episode.
    pub fn from_samples(samples: Vec<Sample>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let rows = samples
            .into_iter()
            .enumerate()
            .map(|(i, sample)| TimedSample {
                timestamp: i as u64 * SAMPLE_INTERVAL_MS,
                sample,
            })
            .collect();

        Some(Self { rows })
    }

    pub fn rows(&self) -> &[TimedSample] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the header and one row per sample in arrival order.
    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(CSV_HEADER)?;
        for row in &self.rows {
            writer.write_record([
                row.timestamp.to_string(),
                format_value(row.sample.x),
                format_value(row.sample.y),
                format_value(row.sample.z),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Decimal form that always keeps a fractional part (`1.0`, not `1`).
fn format_value(value: f64) -> String {
    format!("{value:?}")
}

/// Where and how a record ended up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenRecord {
    pub path: PathBuf,
    pub capture_number: u32,
    pub samples: usize,
}

/// Persists completed episodes as uniquely named CSV files.
#[derive(Debug)]
pub struct RecordWriter {
    dir: PathBuf,
    gesture: String,
    person: String,
    capture_count: u32,
}

impl RecordWriter {
    pub fn new(
        dir: impl Into<PathBuf>,
        gesture: impl Into<String>,
        person: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            gesture: gesture.into(),
            person: person.into(),
            capture_count: 0,
        }
    }

    /// Capture numbers handed out so far in this run.
    pub fn capture_count(&self) -> u32 {
        self.capture_count
    }

    /// Write one episode. Returns the file written and its sample count.
    ///
    /// Files are created exclusively: if a name is already taken, e.g. by an
    /// earlier run in the same second, the capture number is advanced.
    pub fn write(&mut self, samples: Vec<Sample>) -> Result<WrittenRecord> {
        let record = Record::from_samples(samples).ok_or(Error::EmptyRecord)?;
        let stamp = Local::now();

        let (file, path, capture_number) = self.create_unique(stamp)?;
        if let Err(e) = record.write_csv(file) {
            if let Err(rm) = std::fs::remove_file(&path) {
                tracing::warn!("Could not remove partial record {}: {}", path.display(), rm);
            }
            return Err(e);
        }

        Ok(WrittenRecord {
            path,
            capture_number,
            samples: record.len(),
        })
    }

    fn create_unique(&mut self, stamp: DateTime<Local>) -> Result<(File, PathBuf, u32)> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            self.capture_count += 1;
            let path = self.dir.join(self.file_name(self.capture_count, stamp));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((file, path, self.capture_count)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!("{} exists, advancing capture number", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "no free record name",
        )))
    }

    fn file_name(&self, capture_number: u32, stamp: DateTime<Local>) -> String {
        format!(
            "output_{}_{}_{}_{}.csv",
            self.gesture,
            self.person,
            capture_number,
            stamp.format("%Y%m%d_%H%M%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn samples(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::new(i as f64, i as f64 + 0.5, -(i as f64)))
            .collect()
    }

    #[test]
    fn test_timestamps_follow_index() {
        let record = Record::from_samples(samples(4)).unwrap();
        let stamps: Vec<u64> = record.rows().iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![0, 10, 20, 30]);
        assert_eq!(record.rows()[2].sample, Sample::new(2.0, 2.5, -2.0));
    }

    #[test]
    fn test_long_episode_timestamps_stay_exact() {
        let record = Record::from_samples(vec![Sample::new(1.0, 2.0, 3.0); 1000]).unwrap();
        assert_eq!(record.len(), 1000);
        assert_eq!(record.rows()[999].timestamp, 999 * SAMPLE_INTERVAL_MS);
        assert_eq!(SAMPLE_INTERVAL_MS, 10);
    }

    #[test]
    fn test_empty_episode_has_no_record() {
        assert!(Record::from_samples(Vec::new()).is_none());
    }

    #[test]
    fn test_csv_layout() {
        let record = Record::from_samples(
            vec![Sample::new(1.0, 2.0, 3.0), Sample::new(4.0, 5.5, -6.25)],
        )
        .unwrap();

        let mut out = Vec::new();
        record.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec!["timestamp,x,y,z", "0,1.0,2.0,3.0", "10,4.0,5.5,-6.25"]
        );
    }

    #[test]
    fn test_file_name_encodes_labels_and_stamp() {
        let writer = RecordWriter::new("data", "wave", "alice");
        let stamp = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(
            writer.file_name(3, stamp),
            "output_wave_alice_3_20240305_140709.csv"
        );
    }

    #[test]
    fn test_write_creates_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RecordWriter::new(dir.path(), "wave", "bob");

        let first = writer.write(samples(3)).unwrap();
        let second = writer.write(samples(3)).unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(first.capture_number, 1);
        assert_eq!(second.capture_number, 2);
        assert_eq!(first.samples, 3);
        assert!(first.path.exists() && second.path.exists());
    }

    #[test]
    fn test_existing_name_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let mut earlier = RecordWriter::new(dir.path(), "wave", "bob");
        let mut later = RecordWriter::new(dir.path(), "wave", "bob");

        let kept = earlier.write(samples(2)).unwrap();
        let before = std::fs::read_to_string(&kept.path).unwrap();

        let fresh = later.write(samples(5)).unwrap();
        assert_ne!(kept.path, fresh.path);
        assert_eq!(std::fs::read_to_string(&kept.path).unwrap(), before);
    }

    #[test]
    fn test_unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RecordWriter::new(dir.path().join("missing"), "wave", "bob");

        assert!(matches!(writer.write(samples(1)), Err(Error::Io(_))));
        // The writer stays usable once the destination appears
        std::fs::create_dir_all(dir.path().join("missing")).unwrap();
        assert!(writer.write(samples(1)).is_ok());
    }

    #[test]
    fn test_empty_write_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RecordWriter::new(dir.path(), "wave", "bob");
        assert!(matches!(writer.write(Vec::new()), Err(Error::EmptyRecord)));
        assert_eq!(writer.capture_count(), 0);
    }
}
