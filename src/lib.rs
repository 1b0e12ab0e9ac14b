//! # homeloc
//!
//! Infers a mobile user's home and work locations from stationary GPS pings.
//!
//! This library provides:
//! - Great-circle distance, optionally widened by horizontal precision
//! - Density-based clustering (DBSCAN) over a pluggable distance metric
//! - Per-day occupancy aggregation of clusters
//! - A weekday/weekend heuristic selecting home and work clusters
//! - CSV ingestion, time enrichment and filtering helpers for raw pings
//! - A seeded synthetic visit generator for tests and benchmarks
//!
//! ## Features
//!
//! - **`parallel`** (default) - Evaluate neighbourhood queries with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use homeloc::{ClusterConfig, DaySets, InferenceConfig, infer_home_work};
//! use homeloc::synthetic::{PlaceVisits, VisitScenario};
//! use homeloc::GpsPoint;
//!
//! let scenario = VisitScenario {
//!     places: vec![
//!         PlaceVisits::new(GpsPoint::new(48.85, 2.35), 200, vec![13, 14, 15]),
//!         PlaceVisits::new(GpsPoint::new(48.87, 2.30), 200, vec![18, 19]),
//!     ],
//!     jitter_meters: 3.0,
//!     horizontal_precision: 10.0,
//!     seed: 7,
//! };
//!
//! let config = InferenceConfig::new(
//!     ClusterConfig::new(0.05, 20),
//!     DaySets::new([13, 14, 15], [18, 19]),
//! );
//! let inference = infer_home_work(&scenario.generate("user-1"), &config).unwrap();
//! println!("work: {:?}", inference.home_work.work.centroid);
//! println!("home: {:?}", inference.home_work.home.centroid);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{InferenceError, InsufficientData, OptionExt, Result};

// Configuration surface
pub mod config;
pub use config::{ClusterConfig, DaySets, FilterConfig, InferenceConfig};

// Geographic utilities (distance, accuracy widening, centroids)
pub mod geo_utils;

// Pluggable distance metrics
pub mod metric;
pub use metric::{AccuracyHaversine, DistanceMetric, Haversine, MetricKind};

// Density-based clustering
pub mod clustering;
pub use clustering::{Clustering, cluster_points, cluster_with_metric};

// Per-day cluster occupancy
pub mod occupancy;
pub use occupancy::OccupancyTable;

// Home/work heuristic
pub mod selection;
pub use selection::{HomeWork, PlaceCandidate, rank_clusters, select_home_work};

// Stage wiring
pub mod pipeline;
pub use pipeline::{Inference, infer_home_work, infer_with_metric};

// Raw ping ingestion, enrichment and filtering
pub mod ingest;

// Synthetic visit generation
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// Cluster identifier assigned to each point. Negative means noise.
pub type ClusterLabel = i32;

/// Label of points that belong to no dense region.
pub const NOISE: ClusterLabel = -1;

/// A GPS coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use homeloc::GpsPoint;
/// let point = GpsPoint::new(48.8566, 2.3522); // Paris
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// One cleaned, time-enriched GPS ping.
///
/// Produced by [`ingest`] (or any other collaborator) and never mutated by
/// the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Uncertainty radius of the fix in meters.
    pub horizontal_precision: f64,
    /// Day of year, 1-366.
    pub day_of_year: u16,
    /// Day of week, 0 = Monday .. 6 = Sunday.
    pub weekday: u8,
}

impl PointRecord {
    pub fn new(
        user_id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        horizontal_precision: f64,
        day_of_year: u16,
        weekday: u8,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            latitude,
            longitude,
            horizontal_precision,
            day_of_year,
            weekday,
        }
    }

    /// Position without the accuracy and calendar fields.
    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}
