//! Home/work selection from cluster occupancy.
//!
//! The two busiest clusters are the candidates. Among them, the one seen more
//! on business days is *work* and the one seen more on weekend days is *home*.
//!
//! Ties are broken deterministically:
//! - busiest-cluster ranking: total occupancy descending, then lower label first;
//! - work/home: the higher-ranked candidate wins an equal day-set sum.
//!
//! Both roles may land on the same cluster. That is reported through
//! [`HomeWork::is_degenerate`], never silently corrected.

use log::{debug, warn};
use serde::Serialize;

use crate::clustering::check_aligned;
use crate::config::DaySets;
use crate::error::{InsufficientData, OptionExt, Result};
use crate::geo_utils::compute_center;
use crate::occupancy::OccupancyTable;
use crate::{ClusterLabel, GpsPoint, PointRecord};

/// A cluster considered for the home or work role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceCandidate {
    pub label: ClusterLabel,
    /// Mean latitude and longitude of the cluster's member points.
    pub centroid: GpsPoint,
    /// Points in this cluster.
    pub point_count: usize,
    /// Occupancy summed over every observed day.
    pub total_occupancy: u64,
    /// Occupancy summed over the configured business days.
    pub weekday_occupancy: u64,
    /// Occupancy summed over the configured weekend days.
    pub weekend_occupancy: u64,
}

/// Selected home and work places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeWork {
    pub home: PlaceCandidate,
    pub work: PlaceCandidate,
    /// The two busiest clusters, busiest first.
    pub candidates: Vec<PlaceCandidate>,
}

impl HomeWork {
    /// Home and work resolved to the same cluster.
    ///
    /// This can be genuine (someone living at their workplace) so it is not
    /// an error, but callers should not treat the result as two places.
    pub fn is_degenerate(&self) -> bool {
        self.home.label == self.work.label
    }
}

/// Rank clusters by total occupancy, busiest first, lower label on ties.
pub fn rank_clusters(occupancy: &OccupancyTable) -> Vec<(ClusterLabel, u64)> {
    let mut ranked: Vec<(ClusterLabel, u64)> = occupancy
        .cluster_totals()
        .into_iter()
        .filter(|&(_, total)| total > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

fn candidate(
    points: &[PointRecord],
    labels: &[ClusterLabel],
    occupancy: &OccupancyTable,
    days: &DaySets,
    label: ClusterLabel,
    total_occupancy: u64,
) -> PlaceCandidate {
    let members: Vec<GpsPoint> = points
        .iter()
        .zip(labels)
        .filter(|(_, l)| **l == label)
        .map(|(p, _)| p.position())
        .collect();

    PlaceCandidate {
        label,
        centroid: compute_center(&members),
        point_count: members.len(),
        total_occupancy,
        weekday_occupancy: occupancy.sum_over_days(label, &days.weekday_days),
        weekend_occupancy: occupancy.sum_over_days(label, &days.weekend_days),
    }
}

/// Pick the home and work clusters and compute their centroids.
///
/// Fails with [`InsufficientData::NoClusters`] or
/// [`InsufficientData::SingleCluster`] when fewer than two clusters have
/// occupancy, and with an invalid-configuration error for empty day sets.
pub fn select_home_work(
    points: &[PointRecord],
    labels: &[ClusterLabel],
    occupancy: &OccupancyTable,
    days: &DaySets,
) -> Result<HomeWork> {
    check_aligned(points, labels)?;
    days.validate()?;

    let ranked = rank_clusters(occupancy);
    let &(first_label, first_total) = ranked
        .first()
        .ok_or_insufficient(InsufficientData::NoClusters)?;
    let &(second_label, second_total) = ranked
        .get(1)
        .ok_or_insufficient(InsufficientData::SingleCluster { label: first_label })?;

    let first = candidate(points, labels, occupancy, days, first_label, first_total);
    let second = candidate(points, labels, occupancy, days, second_label, second_total);

    debug!(
        "[Selection] top clusters {} ({} pts, {} weekday, {} weekend) and {} ({} pts, {} weekday, {} weekend)",
        first.label,
        first.total_occupancy,
        first.weekday_occupancy,
        first.weekend_occupancy,
        second.label,
        second.total_occupancy,
        second.weekday_occupancy,
        second.weekend_occupancy
    );

    let work = if second.weekday_occupancy > first.weekday_occupancy {
        second.clone()
    } else {
        first.clone()
    };
    let home = if second.weekend_occupancy > first.weekend_occupancy {
        second.clone()
    } else {
        first.clone()
    };

    let result = HomeWork {
        home,
        work,
        candidates: vec![first, second],
    };

    if result.is_degenerate() {
        warn!(
            "[Selection] home and work both resolved to cluster {}",
            result.home.label
        );
    }

    Ok(result)
}
