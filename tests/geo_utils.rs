//! Tests for geo_utils module

use homeloc::geo_utils::*;
use homeloc::GpsPoint;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_haversine_same_point() {
    let p = GpsPoint::new(48.85, 2.35);
    assert_eq!(haversine_km(&p, &p), 0.0);
}

#[test]
fn test_haversine_known_value() {
    // London to Paris is approximately 343.6 km on a 6371 km sphere
    let london = GpsPoint::new(51.5074, -0.1278);
    let paris = GpsPoint::new(48.8566, 2.3522);
    assert!(approx_eq(haversine_km(&london, &paris), 343.556, 0.01));
}

#[test]
fn test_haversine_one_degree_at_equator() {
    let a = GpsPoint::new(0.0, 0.0);
    let b = GpsPoint::new(0.0, 1.0);
    assert!(approx_eq(haversine_km(&a, &b), KM_PER_DEG_LAT, 1e-9));
    assert!(approx_eq(KM_PER_DEG_LAT, 111.1949, 1e-3));
}

#[test]
fn test_haversine_symmetric() {
    let pairs = [
        (GpsPoint::new(40.7128, -74.0060), GpsPoint::new(40.730, -73.935)),
        (GpsPoint::new(-33.87, 151.21), GpsPoint::new(35.68, 139.69)),
        (GpsPoint::new(89.9, 0.0), GpsPoint::new(-89.9, 180.0)),
    ];
    for (a, b) in pairs {
        assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
    }
}

#[test]
fn test_haversine_triangle_inequality() {
    let points = [
        GpsPoint::new(48.85, 2.35),
        GpsPoint::new(48.87, 2.30),
        GpsPoint::new(51.5074, -0.1278),
        GpsPoint::new(40.7128, -74.0060),
        GpsPoint::new(-33.87, 151.21),
    ];
    for a in &points {
        for b in &points {
            for c in &points {
                let direct = haversine_km(a, c);
                let via = haversine_km(a, b) + haversine_km(b, c);
                assert!(direct <= via + 1e-9, "{:?} {:?} {:?}", a, b, c);
            }
        }
    }
}

#[test]
fn test_haversine_antipodal_is_finite() {
    let a = GpsPoint::new(0.0, 0.0);
    let b = GpsPoint::new(0.0, 180.0);
    let d = haversine_km(&a, &b);
    assert!(d.is_finite());
    assert!(approx_eq(d, std::f64::consts::PI * EARTH_RADIUS_KM, 1e-6));
}

#[test]
fn test_widen_far_apart_keeps_raw_distance() {
    // raw 1 km, accuracies 10 m + 20 m: midpoint of 0.97 and 1.03
    assert!(approx_eq(widen_by_accuracy(1.0, 10.0, 20.0), 1.0, 1e-12));
}

#[test]
fn test_widen_overlapping_circles() {
    // raw 10 m, accuracies 30 m + 30 m: min clamps to 0, max is 70 m
    assert!(approx_eq(widen_by_accuracy(0.01, 30.0, 30.0), 0.035, 1e-12));
}

#[test]
fn test_widen_within_bounds() {
    for raw in [0.0, 0.001, 0.01, 0.05, 0.2, 3.0] {
        for acc1 in [0.0, 5.0, 30.0, 65.0] {
            for acc2 in [0.0, 12.0, 50.0] {
                let d = widen_by_accuracy(raw, acc1, acc2);
                let lower = (raw - acc1 / 1000.0 - acc2 / 1000.0).max(0.0);
                let upper = raw + acc1 / 1000.0 + acc2 / 1000.0;
                assert!(d >= 0.0);
                assert!(d >= lower - 1e-12 && d <= upper + 1e-12);
                // Never closer than the raw distance
                assert!(d >= raw - 1e-12);
            }
        }
    }
}

#[test]
fn test_haversine_accuracy_matches_widened_raw() {
    let a = GpsPoint::new(48.85, 2.35);
    let b = GpsPoint::new(48.8501, 2.35);
    let expected = widen_by_accuracy(haversine_km(&a, &b), 15.0, 25.0);
    assert_eq!(haversine_accuracy_km(&a, 15.0, &b, 25.0), expected);
}

#[test]
fn test_compute_center() {
    let points = vec![GpsPoint::new(48.84, 2.34), GpsPoint::new(48.86, 2.36)];
    let center = compute_center(&points);
    assert!(approx_eq(center.latitude, 48.85, 1e-9));
    assert!(approx_eq(center.longitude, 2.35, 1e-9));
}

#[test]
fn test_compute_center_empty() {
    let center = compute_center(&[]);
    assert_eq!(center.latitude, 0.0);
    assert_eq!(center.longitude, 0.0);
}

#[test]
fn test_km_to_degrees() {
    assert!(approx_eq(km_to_lat_degrees(KM_PER_DEG_LAT), 1.0, 1e-12));

    // At 60 degrees a degree of longitude is about half as long
    let lng = km_to_lng_degrees(KM_PER_DEG_LAT, 0.0).unwrap();
    assert!(lng >= 1.0);
    let lng_60 = km_to_lng_degrees(1.0, 60.0).unwrap();
    assert!(lng_60 > 2.0 * km_to_lat_degrees(1.0));
}
