//! Geo utilities: great-circle distance, geofence containment, distance formatting.

use crate::errors::{AppError, AppResult};

/// Mean Earth radius used by the Haversine formula, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates (degrees), in meters.
///
/// NaN inputs propagate as NaN.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

/// True when the user position lies inside the closed disk around the center.
/// A non-positive radius only admits the exact center (and only at radius 0).
pub fn is_within_radius(
    user_lat: f64,
    user_lon: f64,
    center_lat: f64,
    center_lon: f64,
    radius_meters: f64,
) -> bool {
    distance_meters(user_lat, user_lon, center_lat, center_lon) <= radius_meters
}

/// `850m` below one kilometer, `1.2km` from there on.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round())
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

// ---------------------------
// Input checks
// ---------------------------

pub fn check_lat(lat: f64) -> AppResult<f64> {
    if lat.is_finite() && (-90.0..=90.0).contains(&lat) {
        Ok(lat)
    } else {
        Err(AppError::InvalidCoordinate(format!("latitude {lat}")))
    }
}

pub fn check_lon(lon: f64) -> AppResult<f64> {
    if lon.is_finite() && (-180.0..=180.0).contains(&lon) {
        Ok(lon)
    } else {
        Err(AppError::InvalidCoordinate(format!("longitude {lon}")))
    }
}

pub fn check_radius(radius: f64) -> AppResult<f64> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(radius)
    } else {
        Err(AppError::InvalidCoordinate(format!("radius {radius}")))
    }
}
