//! Geographic utilities: great-circle distance, accuracy widening, centroids
//! and degree conversions used for spatial pre-filtering.
//!
//! All distances are in kilometers on a spherical Earth of radius
//! [`EARTH_RADIUS_KM`]. Inputs are not validated; out-of-range degrees give
//! meaningless but finite results.

use crate::GpsPoint;

/// Mean Earth radius used by the haversine formula (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers spanned by one degree of latitude on the haversine sphere.
pub const KM_PER_DEG_LAT: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Great-circle distance between two points in kilometers (haversine formula).
///
/// # Example
/// ```
/// use homeloc::GpsPoint;
/// use homeloc::geo_utils::haversine_km;
///
/// let paris = GpsPoint::new(48.8566, 2.3522);
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let d = haversine_km(&paris, &london);
/// assert!((d - 343.5).abs() < 2.0);
/// ```
pub fn haversine_km(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push `a` marginally above 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Widen a raw distance by two horizontal uncertainty radii.
///
/// Returns the midpoint between the smallest plausible distance
/// `max(0, raw - acc1 - acc2)` and the largest `raw + acc1 + acc2`.
/// `raw_km` is in kilometers, the accuracies in meters.
pub fn widen_by_accuracy(raw_km: f64, accuracy1_m: f64, accuracy2_m: f64) -> f64 {
    let acc1 = accuracy1_m / 1000.0;
    let acc2 = accuracy2_m / 1000.0;

    let min_distance = (raw_km - acc1 - acc2).max(0.0);
    let max_distance = raw_km + acc1 + acc2;

    (min_distance + max_distance) / 2.0
}

/// Accuracy-aware great-circle distance in kilometers.
///
/// Never smaller than [`haversine_km`]. Fixes whose uncertainty circles are
/// disjoint keep their raw distance; overlapping fixes come out at
/// `(raw + acc1 + acc2) / 2`, which only exceeds `raw` while they overlap.
pub fn haversine_accuracy_km(
    p1: &GpsPoint,
    accuracy1_m: f64,
    p2: &GpsPoint,
    accuracy2_m: f64,
) -> f64 {
    widen_by_accuracy(haversine_km(p1, p2), accuracy1_m, accuracy2_m)
}

/// Arithmetic mean of latitudes and longitudes.
///
/// Returns (0, 0) for an empty slice.
pub fn compute_center(points: &[GpsPoint]) -> GpsPoint {
    if points.is_empty() {
        return GpsPoint::new(0.0, 0.0);
    }

    let n = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.latitude, lng + p.longitude));

    GpsPoint::new(lat_sum / n, lng_sum / n)
}

/// Degrees of latitude covering `km` kilometers.
pub fn km_to_lat_degrees(km: f64) -> f64 {
    km / KM_PER_DEG_LAT
}

/// Degrees of longitude guaranteed to cover `km` kilometers around `latitude`.
///
/// Uses the cosine of the most poleward latitude the search disc can reach,
/// so the result is an upper bound. Returns `None` when the disc touches a
/// pole and every longitude must be searched.
pub fn km_to_lng_degrees(km: f64, latitude: f64) -> Option<f64> {
    let lat_span = km_to_lat_degrees(km);
    let extreme_lat = latitude.abs() + lat_span;
    if extreme_lat >= 90.0 {
        return None;
    }

    let cos = extreme_lat.to_radians().cos();
    if cos < 1e-12 {
        return None;
    }

    Some(lat_span / cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lng_degrees_widen_with_latitude() {
        let equator = km_to_lng_degrees(1.0, 0.0).unwrap();
        let north = km_to_lng_degrees(1.0, 60.0).unwrap();
        assert!(north > equator * 1.9);
    }

    #[test]
    fn test_lng_degrees_near_pole() {
        assert!(km_to_lng_degrees(50.0, 89.9).is_none());
    }
}
