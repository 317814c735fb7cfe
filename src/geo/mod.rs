mod math;

pub use math::{destination, distance, EARTH_RADIUS_M};
