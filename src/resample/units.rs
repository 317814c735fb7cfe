use serde::Deserialize;
use strum_macros::Display;

/// Divisor applied to metres per hour in the legacy speed column.
pub const LEGACY_SPEED_DIVISOR: f64 = 10.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

pub fn metres_per_second_to_kmh(mps: f64) -> f64 {
    mps * SECONDS_PER_HOUR / 1000.0
}

/// Unit of the `speed` column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Display, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpeedUnit {
    #[default]
    KilometresPerHour,
    MetresPerSecond,
    /// Metres per hour over `LEGACY_SPEED_DIVISOR`, i.e. decametres per hour.
    DecametresPerHour,
}

impl SpeedUnit {
    pub fn convert_mps(self, mps: f64) -> f64 {
        match self {
            SpeedUnit::KilometresPerHour => metres_per_second_to_kmh(mps),
            SpeedUnit::MetresPerSecond => mps,
            SpeedUnit::DecametresPerHour => mps * SECONDS_PER_HOUR / LEGACY_SPEED_DIVISOR,
        }
    }
}
