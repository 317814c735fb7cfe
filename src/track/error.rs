use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("track file read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed track document: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("track has no trkseg")]
    NoSegment,
    #[error("track segment has no trkpt")]
    EmptySegment,
    #[error("trkpt {index}: missing {attribute} attribute")]
    MissingCoordinate {
        index: usize,
        attribute: &'static str,
    },
    #[error("trkpt {index}: invalid {attribute} '{value}'")]
    InvalidCoordinate {
        index: usize,
        attribute: &'static str,
        value: String,
    },
    #[error("trkpt {index}: invalid elevation '{value}'")]
    InvalidElevation { index: usize, value: String },
    #[error("trkpt {index}: missing time")]
    MissingTimestamp { index: usize },
    #[error("trkpt {index}: couldn't parse time '{value}': {message}")]
    InvalidTimestamp {
        index: usize,
        value: String,
        message: String,
    },
}
