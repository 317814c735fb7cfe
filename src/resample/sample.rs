use serde::Serialize;

/// One resampled output row. Field order is the column order of the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub unix_time: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub altitude: f64,
    pub rider_cadence: f64,
    pub remaining_energy: f64,
    pub power: f64,
}

impl Sample {
    /// Table header, in field order.
    pub const COLUMNS: [&'static str; 8] = [
        "time",
        "lat",
        "lon",
        "speed",
        "altitude",
        "riderCadence",
        "remainingEnergy",
        "power",
    ];

    /// Sample with the sensor columns (cadence, energy, power) left at zero.
    pub fn new(unix_time: i64, latitude: f64, longitude: f64, altitude: f64, speed: f64) -> Self {
        Self {
            unix_time,
            latitude,
            longitude,
            speed,
            altitude,
            rider_cadence: 0.0,
            remaining_energy: 0.0,
            power: 0.0,
        }
    }
}
