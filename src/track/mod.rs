mod error;
mod parsing;
mod types;

pub use error::TrackError;
pub use parsing::{parse_gpx_file, parse_gpx_from_str, parse_timestamp};
pub use types::{Fix, TrackSegment};
