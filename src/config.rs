//! Configuration for clustering, home/work selection and ingestion filtering.
//!
//! Every struct is serde-serializable so a full [`InferenceConfig`] can be
//! loaded from JSON.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::PointRecord;
use crate::error::{InferenceError, Result};
use crate::metric::MetricKind;

/// Density clustering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Neighbourhood radius in kilometers.
    /// Default: 0.01 (~10 m). Tune this to the data; it is not a physical constant.
    pub eps_km: f64,

    /// Minimum neighbourhood size (including the point itself) for a core point.
    /// Default: 100
    pub min_samples: usize,

    /// Pairwise metric used for neighbourhood queries.
    /// Default: plain haversine
    pub metric: MetricKind,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            eps_km: 0.01,
            min_samples: 100,
            metric: MetricKind::Haversine,
        }
    }
}

impl ClusterConfig {
    /// Create a config with the given radius and density, using plain haversine.
    pub fn new(eps_km: f64, min_samples: usize) -> Self {
        Self {
            eps_km,
            min_samples,
            ..Default::default()
        }
    }

    /// Builder-style metric override.
    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    /// Reject parameters for which clustering has no meaning.
    pub fn validate(&self) -> Result<()> {
        if self.eps_km.is_nan() {
            return Err(InferenceError::invalid_config("eps_km is NaN"));
        }
        if self.eps_km <= 0.0 && self.min_samples == 0 {
            return Err(InferenceError::invalid_config(format!(
                "eps_km = {} with min_samples = 0 defines no density",
                self.eps_km
            )));
        }
        Ok(())
    }
}

/// Business days of the two-week reference window.
pub const REFERENCE_WEEKDAYS: [u16; 10] = [13, 14, 15, 16, 17, 20, 21, 22, 23, 24];

/// Weekend days of the two-week reference window.
pub const REFERENCE_WEEKEND: [u16; 4] = [18, 19, 25, 26];

/// Day-of-year values counted as business days and as weekend days.
///
/// These describe one observation window and are injected by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySets {
    pub weekday_days: BTreeSet<u16>,
    pub weekend_days: BTreeSet<u16>,
}

impl DaySets {
    pub fn new(
        weekday_days: impl IntoIterator<Item = u16>,
        weekend_days: impl IntoIterator<Item = u16>,
    ) -> Self {
        Self {
            weekday_days: weekday_days.into_iter().collect(),
            weekend_days: weekend_days.into_iter().collect(),
        }
    }

    /// The two-week window the heuristic was first calibrated on:
    /// business days 13-17 and 20-24, weekend days 18, 19, 25 and 26.
    pub fn reference_window() -> Self {
        Self::new(REFERENCE_WEEKDAYS, REFERENCE_WEEKEND)
    }

    /// Derive the sets from the points' own `weekday` field
    /// (0-4 are business days, 5-6 weekend days).
    pub fn from_points(points: &[PointRecord]) -> Self {
        let mut sets = Self::new([], []);
        for p in points {
            if p.weekday < 5 {
                sets.weekday_days.insert(p.day_of_year);
            } else {
                sets.weekend_days.insert(p.day_of_year);
            }
        }
        sets
    }

    pub fn is_weekday(&self, day_of_year: u16) -> bool {
        self.weekday_days.contains(&day_of_year)
    }

    pub fn is_weekend(&self, day_of_year: u16) -> bool {
        self.weekend_days.contains(&day_of_year)
    }

    /// Both sets must be non-empty. Overlap is allowed.
    pub fn validate(&self) -> Result<()> {
        if self.weekday_days.is_empty() {
            return Err(InferenceError::invalid_config("weekday day set is empty"));
        }
        if self.weekend_days.is_empty() {
            return Err(InferenceError::invalid_config("weekend day set is empty"));
        }

        let overlap = self.weekday_days.intersection(&self.weekend_days).count();
        if overlap > 0 {
            debug!(
                "[DaySets] {} days are both weekday and weekend days",
                overlap
            );
        }
        Ok(())
    }
}

/// Everything the core pipeline needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub clustering: ClusterConfig,
    pub days: DaySets,
}

impl InferenceConfig {
    pub fn new(clustering: ClusterConfig, days: DaySets) -> Self {
        Self { clustering, days }
    }

    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.days.validate()
    }
}

/// Thresholds for dropping moving or imprecise pings before clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Pings at or above this speed are dropped (km/h).
    /// Default: 5.0, people at home or at work rarely move faster
    pub max_speed_kmh: f64,

    /// Pings at or above this horizontal precision are dropped (meters).
    /// Default: 66.0
    pub max_horizontal_precision: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_speed_kmh: 5.0,
            max_horizontal_precision: 66.0,
        }
    }
}
