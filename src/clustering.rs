//! Density-based clustering (DBSCAN) of point records under a pluggable metric.
//!
//! Points are grouped into places when they are chained together by dense
//! neighbourhoods. Neighbourhood queries are pre-filtered with an R-tree and,
//! with the `parallel` feature, evaluated with rayon: first a counting pass
//! over every point to find core points, then batched queries for the core
//! points reached while a cluster grows. Neighbourhoods are never all held in
//! memory at once, which matters for dense places with thousands of fixes.
//! Seeds are walked in input order, so labels never depend on thread count.
//!
//! # Labelling rules
//!
//! - A neighbourhood always contains the query point itself.
//! - A point is *core* when its neighbourhood holds at least `min_samples` points.
//! - Clusters are numbered `0, 1, 2, ...` in order of their first core point.
//! - A border point reachable from several clusters keeps the first (lowest) label.
//! - Everything else is [`NOISE`].

use std::collections::BTreeMap;

use log::{debug, info};
use rstar::{AABB, RTree, RTreeObject};

use crate::config::ClusterConfig;
use crate::error::{InferenceError, Result};
use crate::geo_utils::{km_to_lat_degrees, km_to_lng_degrees};
use crate::metric::DistanceMetric;
use crate::{ClusterLabel, NOISE, PointRecord};

/// Safety margin applied to the degree envelope of a search disc.
const ENVELOPE_PADDING: f64 = 1.01;

/// Core points whose neighbourhoods are fetched together during expansion.
const EXPANSION_BATCH: usize = 256;

/// Result of clustering a point set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    /// One label per input point, in input order.
    pub labels: Vec<ClusterLabel>,
    /// Indices of core points, ascending.
    pub core_indices: Vec<usize>,
    /// Number of distinct non-noise labels.
    pub n_clusters: usize,
}

impl Clustering {
    fn all_noise(n: usize) -> Self {
        Self {
            labels: vec![NOISE; n],
            core_indices: Vec::new(),
            n_clusters: 0,
        }
    }

    /// Number of points labelled noise.
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE).count()
    }

    /// Member count per cluster label (noise excluded).
    pub fn cluster_sizes(&self) -> BTreeMap<ClusterLabel, usize> {
        let mut sizes = BTreeMap::new();
        for &label in self.labels.iter().filter(|&&l| l != NOISE) {
            *sizes.entry(label).or_insert(0) += 1;
        }
        sizes
    }

    /// Indices of the points carrying `label`.
    pub fn members(&self, label: ClusterLabel) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, l)| **l == label)
            .map(|(i, _)| i)
    }
}

/// A point position with its input index for R-tree queries.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

fn build_rtree(points: &[PointRecord]) -> RTree<IndexedPoint> {
    let indexed: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .map(|(i, p)| IndexedPoint {
            idx: i,
            lat: p.latitude,
            lng: p.longitude,
        })
        .collect();
    RTree::bulk_load(indexed)
}

/// Degree envelope containing the great-circle disc of `radius_km` around a point.
fn search_envelope(point: &PointRecord, radius_km: f64) -> AABB<[f64; 2]> {
    let lat_span = km_to_lat_degrees(radius_km) * ENVELOPE_PADDING;

    let (min_lng, max_lng) = match km_to_lng_degrees(radius_km, point.latitude) {
        Some(span) => {
            let span = span * ENVELOPE_PADDING;
            let (lo, hi) = (point.longitude - span, point.longitude + span);
            // Crossing the antimeridian: search every longitude instead of wrapping
            if lo < -180.0 || hi > 180.0 {
                (-360.0, 360.0)
            } else {
                (lo, hi)
            }
        }
        None => (-360.0, 360.0),
    };

    AABB::from_corners(
        [point.latitude - lat_span, min_lng],
        [point.latitude + lat_span, max_lng],
    )
}

/// Answers eps-neighbourhood queries, pruned by an R-tree when the metric allows it.
struct NeighborIndex<'a, M: ?Sized> {
    points: &'a [PointRecord],
    eps_km: f64,
    metric: &'a M,
    rtree: Option<(RTree<IndexedPoint>, f64)>,
}

impl<'a, M> NeighborIndex<'a, M>
where
    M: DistanceMetric + ?Sized,
{
    fn new(points: &'a [PointRecord], eps_km: f64, metric: &'a M) -> Self {
        let rtree = if eps_km > 0.0 {
            metric
                .search_radius_km(eps_km)
                .map(|radius| (build_rtree(points), radius))
        } else {
            None
        };
        Self {
            points,
            eps_km,
            metric,
            rtree,
        }
    }

    /// Visit every neighbour of point `i`, itself included, in no particular order.
    fn for_each_neighbor(&self, i: usize, mut visit: impl FnMut(usize)) {
        if self.eps_km <= 0.0 {
            visit(i);
            return;
        }

        let p = &self.points[i];
        let within = |j: usize| j == i || self.metric.distance(p, &self.points[j]) <= self.eps_km;

        match &self.rtree {
            Some((tree, radius)) => {
                for candidate in tree.locate_in_envelope(&search_envelope(p, *radius)) {
                    if within(candidate.idx) {
                        visit(candidate.idx);
                    }
                }
            }
            None => {
                for j in 0..self.points.len() {
                    if within(j) {
                        visit(j);
                    }
                }
            }
        }
    }

    fn count(&self, i: usize) -> usize {
        let mut count = 0;
        self.for_each_neighbor(i, |_| count += 1);
        count
    }

    /// Neighbourhood of point `i`, sorted ascending.
    fn neighbors(&self, i: usize) -> Vec<usize> {
        let mut found = Vec::new();
        self.for_each_neighbor(i, |j| found.push(j));
        found.sort_unstable();
        found
    }

    /// Neighbourhood size of every point.
    fn counts(&self) -> Vec<usize> {
        #[cfg(feature = "parallel")]
        let counts: Vec<usize> = {
            use rayon::prelude::*;
            (0..self.points.len())
                .into_par_iter()
                .map(|i| self.count(i))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let counts: Vec<usize> = (0..self.points.len()).map(|i| self.count(i)).collect();

        counts
    }

    /// Neighbourhoods of a batch of points, in batch order.
    fn neighbors_batch(&self, batch: &[usize]) -> Vec<Vec<usize>> {
        #[cfg(feature = "parallel")]
        let found: Vec<Vec<usize>> = {
            use rayon::prelude::*;
            batch.par_iter().map(|&i| self.neighbors(i)).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let found: Vec<Vec<usize>> = batch.iter().map(|&i| self.neighbors(i)).collect();

        found
    }
}

/// Cluster points with the metric selected in `config`.
///
/// # Example
/// ```
/// use homeloc::{ClusterConfig, PointRecord, NOISE, cluster_points};
///
/// let mut points: Vec<PointRecord> = (0..5)
///     .map(|i| PointRecord::new("u", 48.85 + i as f64 * 1e-6, 2.35, 10.0, 13, 0))
///     .collect();
/// points.push(PointRecord::new("u", 40.0, -74.0, 10.0, 13, 0));
///
/// let clustering = cluster_points(&points, &ClusterConfig::new(0.05, 3)).unwrap();
/// assert_eq!(clustering.n_clusters, 1);
/// assert_eq!(clustering.labels[5], NOISE);
/// ```
pub fn cluster_points(points: &[PointRecord], config: &ClusterConfig) -> Result<Clustering> {
    cluster_with_metric(points, config.eps_km, config.min_samples, &config.metric)
}

/// Cluster points with an arbitrary metric.
///
/// Returns [`InferenceError::InvalidConfiguration`] for a NaN `eps_km` or
/// for `eps_km <= 0` combined with `min_samples == 0`, and
/// [`InferenceError::InvalidPoint`] for a NaN or infinite coordinate.
/// Fewer points than `min_samples` is not an error: every point is simply noise.
pub fn cluster_with_metric<M>(
    points: &[PointRecord],
    eps_km: f64,
    min_samples: usize,
    metric: &M,
) -> Result<Clustering>
where
    M: DistanceMetric + ?Sized,
{
    ClusterConfig {
        eps_km,
        min_samples,
        ..Default::default()
    }
    .validate()?;

    check_finite(points)?;

    let n = points.len();
    if n < min_samples {
        debug!(
            "[Clustering] {} points < min_samples {}, all noise",
            n, min_samples
        );
        return Ok(Clustering::all_noise(n));
    }

    let index = NeighborIndex::new(points, eps_km, metric);
    let counts = index.counts();
    let is_core: Vec<bool> = counts.iter().map(|&c| c >= min_samples).collect();

    debug!(
        "[Clustering] {} points, {} core, {} neighbour links",
        n,
        is_core.iter().filter(|&&c| c).count(),
        counts.iter().sum::<usize>()
    );

    let mut labels = vec![NOISE; n];
    let mut next_label: ClusterLabel = 0;
    let mut frontier: Vec<usize> = Vec::new();

    for seed in 0..n {
        if labels[seed] != NOISE || !is_core[seed] {
            continue;
        }

        labels[seed] = next_label;
        frontier.push(seed);

        // One cluster grows to completion before the next seed, so the
        // order core points are expanded in cannot change any label.
        while !frontier.is_empty() {
            let batch = frontier.split_off(frontier.len().saturating_sub(EXPANSION_BATCH));
            for neighborhood in index.neighbors_batch(&batch) {
                for q in neighborhood {
                    if labels[q] == NOISE {
                        labels[q] = next_label;
                        // Border points join but do not extend the cluster
                        if is_core[q] {
                            frontier.push(q);
                        }
                    }
                }
            }
        }

        next_label += 1;
    }

    let core_indices: Vec<usize> = (0..n).filter(|&i| is_core[i]).collect();
    let clustering = Clustering {
        labels,
        core_indices,
        n_clusters: next_label as usize,
    };

    info!(
        "[Clustering] {} clusters, {} noise points out of {}",
        clustering.n_clusters,
        clustering.noise_count(),
        n
    );

    Ok(clustering)
}

/// Reject NaN or infinite coordinates, which no metric or index can order.
fn check_finite(points: &[PointRecord]) -> Result<()> {
    match points
        .iter()
        .position(|p| !p.latitude.is_finite() || !p.longitude.is_finite())
    {
        Some(index) => Err(InferenceError::InvalidPoint {
            index,
            latitude: points[index].latitude,
            longitude: points[index].longitude,
        }),
        None => Ok(()),
    }
}

/// Validate clustering output against the points it labels.
pub(crate) fn check_aligned(points: &[PointRecord], labels: &[ClusterLabel]) -> Result<()> {
    if points.len() != labels.len() {
        return Err(InferenceError::LengthMismatch {
            points: points.len(),
            labels: labels.len(),
        });
    }
    Ok(())
}
