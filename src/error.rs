//! Unified error handling for the inference pipeline.
//!
//! Every fallible stage reports a typed [`InferenceError`] instead of
//! panicking. A home/work pair that resolves to the same cluster is not an
//! error; see [`crate::HomeWork::is_degenerate`].

use thiserror::Error;

use crate::ClusterLabel;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Why there was not enough data to infer a home/work pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsufficientData {
    /// Fewer points than `min_samples`, so no neighbourhood can be dense.
    TooFewPoints { count: usize, min_samples: usize },
    /// Clustering labelled every point as noise.
    NoClusters,
    /// Only one non-noise cluster with observed occupancy exists.
    SingleCluster { label: ClusterLabel },
}

impl std::fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsufficientData::TooFewPoints { count, min_samples } => write!(
                f,
                "{} points supplied, at least {} required",
                count, min_samples
            ),
            InsufficientData::NoClusters => write!(f, "no clusters found, every point is noise"),
            InsufficientData::SingleCluster { label } => {
                write!(f, "only one cluster found (label {})", label)
            }
        }
    }
}

/// Errors surfaced by the clustering, aggregation, selection and ingestion stages.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Configuration values that make the computation meaningless.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Not enough points or clusters to select both home and work.
    #[error("insufficient data: {0}")]
    InsufficientData(InsufficientData),

    /// Labels are not aligned one-to-one with the points they describe.
    #[error("length mismatch: {points} points but {labels} labels")]
    LengthMismatch { points: usize, labels: usize },

    /// A point whose coordinates cannot be placed on the sphere.
    #[error("point {index} has non-finite position ({latitude}, {longitude})")]
    InvalidPoint {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    /// A malformed input row.
    #[error("line {line}: {reason}")]
    Ingest { line: usize, reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl InferenceError {
    /// Shorthand for an [`InferenceError::InvalidConfiguration`].
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        InferenceError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Whether this error means "not enough data" rather than a caller mistake.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, InferenceError::InsufficientData(_))
    }
}

impl From<InsufficientData> for InferenceError {
    fn from(reason: InsufficientData) -> Self {
        InferenceError::InsufficientData(reason)
    }
}

/// Extension trait turning missing values into typed errors.
pub trait OptionExt<T> {
    /// Convert `None` into [`InferenceError::InsufficientData`].
    fn ok_or_insufficient(self, reason: InsufficientData) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_insufficient(self, reason: InsufficientData) -> Result<T> {
        self.ok_or(InferenceError::InsufficientData(reason))
    }
}
