//! Per-day occupancy counts of each cluster.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::clustering::check_aligned;
use crate::error::Result;
use crate::{ClusterLabel, PointRecord};

/// Sparse day-of-year × cluster-label point counts.
///
/// Noise points never appear. A day or cluster with no observed points is
/// absent rather than stored as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OccupancyTable {
    counts: BTreeMap<u16, BTreeMap<ClusterLabel, u64>>,
}

impl OccupancyTable {
    /// Count labelled points per day. `labels` must be aligned with `points`.
    pub fn build(points: &[PointRecord], labels: &[ClusterLabel]) -> Result<Self> {
        check_aligned(points, labels)?;
        Ok(Self::from_observations(
            points.iter().zip(labels).map(|(p, &l)| (p.day_of_year, l)),
        ))
    }

    /// Count `(day_of_year, label)` observations, skipping negative labels.
    pub fn from_observations(observations: impl IntoIterator<Item = (u16, ClusterLabel)>) -> Self {
        let mut counts: BTreeMap<u16, BTreeMap<ClusterLabel, u64>> = BTreeMap::new();
        for (day, label) in observations {
            if label < 0 {
                continue;
            }
            *counts.entry(day).or_default().entry(label).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Count for one cell, `None` when nothing was observed there.
    pub fn get(&self, day_of_year: u16, label: ClusterLabel) -> Option<u64> {
        self.counts.get(&day_of_year)?.get(&label).copied()
    }

    /// Observed days, ascending.
    pub fn days(&self) -> impl Iterator<Item = u16> + '_ {
        self.counts.keys().copied()
    }

    /// Cluster labels observed on at least one day.
    pub fn clusters(&self) -> BTreeSet<ClusterLabel> {
        self.counts
            .values()
            .flat_map(|row| row.keys().copied())
            .collect()
    }

    /// All non-empty cells as `(day, label, count)`, ordered by day then label.
    pub fn iter(&self) -> impl Iterator<Item = (u16, ClusterLabel, u64)> + '_ {
        self.counts
            .iter()
            .flat_map(|(&day, row)| row.iter().map(move |(&label, &count)| (day, label, count)))
    }

    /// Sum of every cell.
    pub fn total(&self) -> u64 {
        self.iter().map(|(_, _, count)| count).sum()
    }

    /// Occupancy summed over all days, per cluster.
    pub fn cluster_totals(&self) -> BTreeMap<ClusterLabel, u64> {
        let mut totals = BTreeMap::new();
        for (_, label, count) in self.iter() {
            *totals.entry(label).or_insert(0) += count;
        }
        totals
    }

    /// Occupancy of `label` summed over the given days.
    pub fn sum_over_days(&self, label: ClusterLabel, days: &BTreeSet<u16>) -> u64 {
        days.iter().filter_map(|&day| self.get(day, label)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
