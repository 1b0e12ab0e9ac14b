//! Synthetic GPS ping generator for tests, benchmarks and demos.
//!
//! Generates pings scattered around known places on known days, providing
//! ground truth for validating clustering and home/work selection.
//!
//! # Example
//!
//! ```rust
//! use homeloc::GpsPoint;
//! use homeloc::synthetic::{PlaceVisits, VisitScenario};
//!
//! let scenario = VisitScenario {
//!     places: vec![PlaceVisits::new(GpsPoint::new(40.7128, -74.0060), 100, vec![13, 14])],
//!     jitter_meters: 5.0,
//!     horizontal_precision: 12.0,
//!     seed: 42,
//! };
//!
//! let points = scenario.generate("user-1");
//! assert_eq!(points.len(), 100);
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub use crate::config::{REFERENCE_WEEKDAYS, REFERENCE_WEEKEND};
use crate::{GpsPoint, PointRecord};

// ============================================================================
// Types
// ============================================================================

/// Pings observed around one place.
#[derive(Debug, Clone)]
pub struct PlaceVisits {
    /// True location of the place.
    pub center: GpsPoint,
    /// Number of pings to generate.
    pub point_count: usize,
    /// Day-of-year values the pings are spread over, round-robin.
    pub days: Vec<u16>,
}

impl PlaceVisits {
    pub fn new(center: GpsPoint, point_count: usize, days: Vec<u16>) -> Self {
        Self {
            center,
            point_count,
            days,
        }
    }
}

/// Scenario configuration for generating synthetic pings.
#[derive(Debug, Clone)]
pub struct VisitScenario {
    /// Places visited.
    pub places: Vec<PlaceVisits>,
    /// Pings are drawn uniformly within this radius of their place (meters).
    pub jitter_meters: f64,
    /// Horizontal precision stamped on every ping (meters).
    pub horizontal_precision: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl VisitScenario {
    /// An office on business days and a flat on weekends, Manhattan / Brooklyn.
    pub fn commuter(points_per_place: usize, seed: u64) -> Self {
        Self {
            places: vec![
                PlaceVisits::new(
                    GpsPoint::new(40.7128, -74.0060),
                    points_per_place,
                    REFERENCE_WEEKDAYS.to_vec(),
                ),
                PlaceVisits::new(
                    GpsPoint::new(40.7300, -73.9350),
                    points_per_place,
                    REFERENCE_WEEKEND.to_vec(),
                ),
            ],
            jitter_meters: 5.0,
            horizontal_precision: 10.0,
            seed,
        }
    }

    /// Generate shuffled pings for `user_id`.
    pub fn generate(&self, user_id: &str) -> Vec<PointRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let total = self.places.iter().map(|p| p.point_count).sum();
        let mut points = Vec::with_capacity(total);

        for place in &self.places {
            for i in 0..place.point_count {
                let position = jitter_uniform(&place.center, self.jitter_meters, &mut rng);
                let day = match place.days.as_slice() {
                    [] => 1,
                    days => days[i % days.len()],
                };
                points.push(PointRecord::new(
                    user_id,
                    position.latitude,
                    position.longitude,
                    self.horizontal_precision,
                    day,
                    synthetic_weekday(day),
                ));
            }
        }

        points.shuffle(&mut rng);
        points
    }
}

/// Weekday of a day-of-year in the synthetic calendar, where day 13 is a Monday.
pub fn synthetic_weekday(day_of_year: u16) -> u8 {
    ((day_of_year as u32 + 1) % 7) as u8
}

/// `count` pings scattered uniformly over a square of `half_width_meters`
/// around `center`, one per day in round-robin. Useful as background noise.
pub fn scattered_points(
    user_id: &str,
    center: &GpsPoint,
    half_width_meters: f64,
    count: usize,
    days: &[u16],
    seed: u64,
) -> Vec<PointRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let dy: f64 = rng.gen_range(-half_width_meters..=half_width_meters);
            let dx: f64 = rng.gen_range(-half_width_meters..=half_width_meters);
            let day = if days.is_empty() { 1 } else { days[i % days.len()] };
            PointRecord::new(
                user_id,
                center.latitude + meters_to_deg_lat(dy),
                center.longitude + meters_to_deg_lng(dx, center.latitude),
                30.0,
                day,
                synthetic_weekday(day),
            )
        })
        .collect()
}

// ============================================================================
// Coordinate Helpers
// ============================================================================

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Convert meters to degrees of latitude.
fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

/// Convert meters to degrees of longitude at a given latitude.
fn meters_to_deg_lng(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg_lng = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg_lng.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg_lng
}

/// A point drawn uniformly from the disc of `radius_meters` around `center`.
fn jitter_uniform(center: &GpsPoint, radius_meters: f64, rng: &mut StdRng) -> GpsPoint {
    if radius_meters <= 0.0 {
        return *center;
    }

    // sqrt keeps the density uniform over the disc area
    let r = radius_meters * rng.r#gen::<f64>().sqrt();
    let theta = rng.gen_range(0.0..2.0 * PI);

    GpsPoint::new(
        center.latitude + meters_to_deg_lat(r * theta.sin()),
        center.longitude + meters_to_deg_lng(r * theta.cos(), center.latitude),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::haversine_km;

    #[test]
    fn test_jitter_stays_within_radius() {
        let center = GpsPoint::new(40.7128, -74.0060);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let p = jitter_uniform(&center, 5.0, &mut rng);
            assert!(haversine_km(&center, &p) < 0.0051);
        }
    }

    #[test]
    fn test_synthetic_weekday_matches_reference_window() {
        assert!(REFERENCE_WEEKDAYS.iter().all(|&d| synthetic_weekday(d) < 5));
        assert!(REFERENCE_WEEKEND.iter().all(|&d| synthetic_weekday(d) >= 5));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let scenario = VisitScenario::commuter(50, 9);
        assert_eq!(scenario.generate("u"), scenario.generate("u"));
    }
}
