//! End-to-end inference: clustering, occupancy aggregation, selection.
//!
//! Each stage consumes the previous stage's output by value or reference and
//! returns a new structure, so the labels produced here are the exact labels
//! the selector saw.

use log::info;

use crate::clustering::{Clustering, cluster_with_metric};
use crate::config::InferenceConfig;
use crate::error::{InferenceError, InsufficientData, Result};
use crate::metric::DistanceMetric;
use crate::occupancy::OccupancyTable;
use crate::selection::{HomeWork, select_home_work};
use crate::PointRecord;

/// Everything produced by one inference run.
#[derive(Debug, Clone)]
pub struct Inference {
    /// Cluster labels aligned with the input points.
    pub clustering: Clustering,
    pub occupancy: OccupancyTable,
    pub home_work: HomeWork,
}

/// Infer home and work for one user's points using the configured metric.
///
/// # Example
/// ```
/// use homeloc::{ClusterConfig, DaySets, InferenceConfig, PointRecord, infer_home_work};
///
/// let mut points = Vec::new();
/// for i in 0..20 {
///     let jitter = (i % 5) as f64 * 1e-6;
///     points.push(PointRecord::new("u", 48.85 + jitter, 2.35, 5.0, 13, 0));
///     points.push(PointRecord::new("u", 48.87 + jitter, 2.30, 5.0, 18, 5));
/// }
///
/// let config = InferenceConfig::new(
///     ClusterConfig::new(0.05, 5),
///     DaySets::new([13], [18]),
/// );
/// let result = infer_home_work(&points, &config).unwrap();
/// assert!((result.home_work.work.centroid.latitude - 48.85).abs() < 1e-4);
/// assert!((result.home_work.home.centroid.latitude - 48.87).abs() < 1e-4);
/// ```
pub fn infer_home_work(points: &[PointRecord], config: &InferenceConfig) -> Result<Inference> {
    infer_with_metric(points, config, &config.clustering.metric)
}

/// Like [`infer_home_work`] but with a caller-supplied metric; the
/// `metric` field of the config is ignored.
pub fn infer_with_metric<M>(
    points: &[PointRecord],
    config: &InferenceConfig,
    metric: &M,
) -> Result<Inference>
where
    M: DistanceMetric + ?Sized,
{
    config.validate()?;

    let min_samples = config.clustering.min_samples;
    if points.len() < min_samples {
        return Err(InferenceError::InsufficientData(
            InsufficientData::TooFewPoints {
                count: points.len(),
                min_samples,
            },
        ));
    }

    let clustering = cluster_with_metric(points, config.clustering.eps_km, min_samples, metric)?;
    if clustering.n_clusters == 0 {
        return Err(InsufficientData::NoClusters.into());
    }

    let occupancy = OccupancyTable::build(points, &clustering.labels)?;
    let home_work = select_home_work(points, &clustering.labels, &occupancy, &config.days)?;

    info!(
        "[Pipeline] home = cluster {} at ({:.6}, {:.6}), work = cluster {} at ({:.6}, {:.6})",
        home_work.home.label,
        home_work.home.centroid.latitude,
        home_work.home.centroid.longitude,
        home_work.work.label,
        home_work.work.centroid.latitude,
        home_work.work.centroid.longitude
    );

    Ok(Inference {
        clustering,
        occupancy,
        home_work,
    })
}
