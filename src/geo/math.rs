/// Spherical Earth radius shared by `distance` and `destination`.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Great-circle (haversine) distance in metres between two points given in degrees.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let half_dlat = ((lat2 - lat1).to_radians() / 2.0).sin();
    let half_dlon = ((lon2 - lon1).to_radians() / 2.0).sin();

    let h = half_dlat * half_dlat + phi1.cos() * phi2.cos() * half_dlon * half_dlon;
    // Rounding can push h slightly past 1.0 for antipodal points.
    2.0 * EARTH_RADIUS_M * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Point reached by travelling `distance_m` from (`lat`, `lon`) along the
/// initial bearing `bearing_deg` (clockwise from north). Returns degrees,
/// longitude normalised to [-180, 180].
pub fn destination(lat: f64, lon: f64, bearing_deg: f64, distance_m: f64) -> (f64, f64) {
    let phi1 = lat.to_radians();
    let lambda1 = lon.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let sin_phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos())
        .clamp(-1.0, 1.0);
    let phi2 = sin_phi2.asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

    (phi2.to_degrees(), normalize_lon(lambda2.to_degrees()))
}

fn normalize_lon(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}
