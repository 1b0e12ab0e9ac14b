//! Pairwise distance metrics for density clustering.
//!
//! The clustering engine is generic over [`DistanceMetric`], so geographic
//! points are compared on the sphere rather than in degree space. Both
//! haversine variants can be swapped at runtime through [`MetricKind`], and
//! any `Fn(&PointRecord, &PointRecord) -> f64` closure is a metric too.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PointRecord;
use crate::geo_utils::{haversine_accuracy_km, haversine_km};

/// A symmetric, non-negative distance between two point records, in kilometers.
pub trait DistanceMetric: Sync {
    /// Distance between `a` and `b` in kilometers.
    fn distance(&self, a: &PointRecord, b: &PointRecord) -> f64;

    /// Great-circle radius (km) guaranteed to contain every point within
    /// `eps_km` of a query point under this metric.
    ///
    /// Metrics that are never smaller than the plain haversine distance can
    /// return `Some(eps_km)`, which lets the clustering engine prune
    /// candidates with a spatial index. `None` forces a full scan.
    fn search_radius_km(&self, _eps_km: f64) -> Option<f64> {
        None
    }
}

/// Plain great-circle distance, ignoring horizontal precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Haversine;

impl DistanceMetric for Haversine {
    fn distance(&self, a: &PointRecord, b: &PointRecord) -> f64 {
        haversine_km(&a.position(), &b.position())
    }

    fn search_radius_km(&self, eps_km: f64) -> Option<f64> {
        Some(eps_km)
    }
}

/// Great-circle distance widened by both fixes' horizontal precision.
///
/// Always at least the plain haversine distance, so haversine pruning is safe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccuracyHaversine;

impl DistanceMetric for AccuracyHaversine {
    fn distance(&self, a: &PointRecord, b: &PointRecord) -> f64 {
        haversine_accuracy_km(
            &a.position(),
            a.horizontal_precision,
            &b.position(),
            b.horizontal_precision,
        )
    }

    fn search_radius_km(&self, eps_km: f64) -> Option<f64> {
        Some(eps_km)
    }
}

impl<F> DistanceMetric for F
where
    F: Fn(&PointRecord, &PointRecord) -> f64 + Sync,
{
    fn distance(&self, a: &PointRecord, b: &PointRecord) -> f64 {
        self(a, b)
    }
}

/// Runtime choice between the built-in metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// [`Haversine`]: use when horizontal precision is not trusted.
    #[default]
    Haversine,
    /// [`AccuracyHaversine`]: widen distances by horizontal precision.
    AccuracyAware,
}

impl DistanceMetric for MetricKind {
    fn distance(&self, a: &PointRecord, b: &PointRecord) -> f64 {
        match self {
            MetricKind::Haversine => Haversine.distance(a, b),
            MetricKind::AccuracyAware => AccuracyHaversine.distance(a, b),
        }
    }

    fn search_radius_km(&self, eps_km: f64) -> Option<f64> {
        match self {
            MetricKind::Haversine => Haversine.search_radius_km(eps_km),
            MetricKind::AccuracyAware => AccuracyHaversine.search_radius_km(eps_km),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Haversine => write!(f, "haversine"),
            MetricKind::AccuracyAware => write!(f, "accuracy"),
        }
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "haversine" | "plain" => Ok(MetricKind::Haversine),
            "accuracy" | "accuracy_aware" | "accuracy-aware" => Ok(MetricKind::AccuracyAware),
            other => Err(format!(
                "unknown metric '{}', expected 'haversine' or 'accuracy'",
                other
            )),
        }
    }
}
