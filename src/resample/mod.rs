mod error;
mod resampler;
mod sample;
mod summary;
mod units;

pub use error::ResampleError;
pub use resampler::{InterpolationMode, ResampleOptions, Resampler};
pub use sample::Sample;
pub use summary::TrackSummary;
pub use units::{metres_per_second_to_kmh, SpeedUnit, LEGACY_SPEED_DIVISOR};
