//! Accelerometer sample type and line parser.

use std::num::ParseFloatError;

/// One 3-axis accelerometer reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Why a sample-candidate line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleParseError {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),
    #[error("field {index} is not a number: {source}")]
    InvalidNumber {
        index: usize,
        #[source]
        source: ParseFloatError,
    },
    #[error("field {0} is not finite")]
    NonFinite(usize),
}

/// Parse an `x,y,z` line into a [`Sample`].
///
/// Fields are trimmed before parsing. Failures are returned, never raised,
/// so the caller decides whether to log or skip.
pub fn parse_sample(line: &str) -> Result<Sample, SampleParseError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 3 {
        return Err(SampleParseError::FieldCount(fields.len()));
    }

    let mut values = [0.0f64; 3];
    for (index, (slot, field)) in values.iter_mut().zip(&fields).enumerate() {
        let value: f64 = field
            .trim()
            .parse()
            .map_err(|source| SampleParseError::InvalidNumber { index, source })?;
        if !value.is_finite() {
            return Err(SampleParseError::NonFinite(index));
        }
        *slot = value;
    }

    Ok(Sample::new(values[0], values[1], values[2]))
}
