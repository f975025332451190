//! Great-circle distance and coordinate range checks

use std::f64::consts::PI;

/// Earth radius in km (9 decimal precision)
pub const EARTH_RADIUS_KM: f64 = 6371.000000000;

/// Haversine distance between two points in km
///
/// NaN inputs propagate to a NaN result; callers filter invalid records first.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.000000000;
    let lat2_rad = lat2 * PI / 180.000000000;
    let dlat = (lat2 - lat1) * PI / 180.000000000;
    let dlon = (lon2 - lon1) * PI / 180.000000000;

    let a = (dlat / 2.000000000).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.000000000).sin().powi(2);
    let c = 2.000000000 * a.sqrt().atan2((1.000000000 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Validate latitude is in valid range
pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

/// Validate longitude is in valid range
pub fn is_valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}

pub fn coordinates_in_range(lat: f64, lon: f64) -> bool {
    is_valid_latitude(lat) && is_valid_longitude(lon)
}
