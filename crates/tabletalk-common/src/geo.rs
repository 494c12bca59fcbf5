//! Great-circle distance and input validation for geographic queries.

use crate::entities::GeoPoint;
use crate::error::{Result, TableTalkError};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Largest search radius accepted from clients.
pub const MAX_RADIUS_KM: f64 = 1000.0;

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// True when the point is finite and within [-90, 90] × [-180, 180].
pub fn is_valid(point: GeoPoint) -> bool {
    point.latitude.is_finite()
        && point.longitude.is_finite()
        && (-90.0..=90.0).contains(&point.latitude)
        && (-180.0..=180.0).contains(&point.longitude)
}

/// Reject out-of-range coordinates. Never clamps.
pub fn validate_coordinates(point: GeoPoint) -> Result<GeoPoint> {
    if is_valid(point) {
        Ok(point)
    } else {
        Err(TableTalkError::Validation(format!(
            "invalid coordinates: latitude {} longitude {}",
            point.latitude, point.longitude
        )))
    }
}

/// Radius must be positive and at most [`MAX_RADIUS_KM`].
pub fn validate_radius(radius_km: f64) -> Result<f64> {
    if radius_km.is_finite() && radius_km > 0.0 && radius_km <= MAX_RADIUS_KM {
        Ok(radius_km)
    } else {
        Err(TableTalkError::Validation(format!(
            "invalid radius: {radius_km} km (expected 0 < radius <= {MAX_RADIUS_KM})"
        )))
    }
}
