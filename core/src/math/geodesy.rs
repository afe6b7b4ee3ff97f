//! Great-circle geometry on a spherical Earth.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per degree of great-circle arc.
pub const KM_PER_DEG: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_KM / 360.0;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Result of an inverse geodesic problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inverse {
    pub distance_km: f64,
    /// Initial azimuth at the first point, degrees in [0, 360).
    pub azimuth_deg: f64,
}

/// Distance and azimuth between two geographic points.
pub trait InverseGeodesic {
    fn inverse(&self, from: GeoPoint, to: GeoPoint) -> Inverse;
}

/// Haversine distance and initial great-circle bearing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalEarth;

impl InverseGeodesic for SphericalEarth {
    fn inverse(&self, from: GeoPoint, to: GeoPoint) -> Inverse {
        let lat1 = from.latitude.to_radians();
        let lat2 = to.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (to.longitude - from.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());

        let x = dlon.sin() * lat2.cos();
        let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

        Inverse {
            distance_km: EARTH_RADIUS_KM * c,
            azimuth_deg: normalize_deg(x.atan2(y).to_degrees()),
        }
    }
}

/// Wraps an angle in degrees into [0, 360).
pub fn normalize_deg(angle: f64) -> f64 {
    let wrapped = ((angle % 360.0) + 360.0) % 360.0;
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Mean position of a set of points, averaged as unit vectors so that
/// longitudes straddling the antimeridian do not cancel.
pub fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }

    let (mut x, mut y, mut z) = (0.0_f64, 0.0_f64, 0.0_f64);
    for point in points {
        let lat = point.latitude.to_radians();
        let lon = point.longitude.to_radians();
        x += lat.cos() * lon.cos();
        y += lat.cos() * lon.sin();
        z += lat.sin();
    }

    let horizontal = x.hypot(y);
    if horizontal == 0.0 && z == 0.0 {
        return None;
    }

    Some(GeoPoint::new(
        z.atan2(horizontal).to_degrees(),
        y.atan2(x).to_degrees(),
    ))
}

pub fn slowness_deg_to_km(slowness: f64) -> f64 {
    slowness / KM_PER_DEG
}

pub fn slowness_km_to_deg(slowness: f64) -> f64 {
    slowness * KM_PER_DEG
}
