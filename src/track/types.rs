use chrono::{DateTime, Utc};

use super::error::TrackError;
use super::parsing::parse_timestamp;

/// One raw GPS observation, as read from the track file.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    /// Raw `<time>` text. Parsed lazily so a bad value fails the run where it is reached.
    pub time: Option<String>,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64, elevation: f64, time: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
            time: Some(time.into()),
        }
    }

    /// `index` is the fix position within its segment, used for error reporting.
    pub fn timestamp(&self, index: usize) -> Result<DateTime<Utc>, TrackError> {
        let raw = self
            .time
            .as_deref()
            .ok_or(TrackError::MissingTimestamp { index })?;
        parse_timestamp(raw).map_err(|message| TrackError::InvalidTimestamp {
            index,
            value: raw.to_string(),
            message,
        })
    }
}

/// Ordered fixes of a single continuous recording.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSegment {
    pub name: Option<String>,
    pub fixes: Vec<Fix>,
}

impl TrackSegment {
    pub fn new(name: Option<String>, fixes: Vec<Fix>) -> Self {
        Self { name, fixes }
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}
