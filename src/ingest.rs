//! Raw ping ingestion: CSV reading, calendar enrichment and threshold filtering.
//!
//! The input is a header-less CSV with the columns
//! `user_id, timestamp, latitude, longitude, horizontal_precision, speed, crc32_hash`,
//! where `timestamp` is unix seconds and `speed` is in m/s.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, TimeZone};
use chrono_tz::Tz;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{GpsPoint, PointRecord};
use crate::config::FilterConfig;
use crate::error::{InferenceError, Result};

/// One CSV row, as recorded by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPing {
    pub user_id: String,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters.
    pub horizontal_precision: f64,
    /// Meters per second.
    pub speed: f64,
    #[serde(default)]
    pub crc32_hash: String,
}

/// A ping with calendar fields derived in the observer's timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPing {
    pub raw: RawPing,
    /// Day of week, 0 = Monday.
    pub weekday: u8,
    /// Day of year, 1-366.
    pub day_of_year: u16,
    pub speed_kmh: f64,
    /// Seconds since local midnight of the first observed day.
    pub timestamp_norm: i64,
}

impl EnrichedPing {
    pub fn to_point_record(&self) -> PointRecord {
        PointRecord::new(
            self.raw.user_id.clone(),
            self.raw.latitude,
            self.raw.longitude,
            self.raw.horizontal_precision,
            self.day_of_year,
            self.weekday,
        )
    }
}

/// Read every ping from a CSV file.
pub fn read_csv(path: &Path) -> Result<Vec<RawPing>> {
    let file = File::open(path)?;
    read_records(file)
}

/// Read every ping from header-less CSV data.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawPing>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut pings = Vec::new();
    for (i, row) in csv_reader.deserialize::<RawPing>().enumerate() {
        let ping = row.map_err(|e| InferenceError::Ingest {
            line: e.position().map_or(i + 1, |p| p.line() as usize),
            reason: e.to_string(),
        })?;
        pings.push(ping);
    }

    debug!("[Ingest] read {} pings", pings.len());
    Ok(pings)
}

/// Speed conversion from m/s to km/h.
pub fn speed_to_kmh(speed_ms: f64) -> f64 {
    speed_ms * 3600.0 / 1000.0
}

/// Derive weekday, day of year, km/h speed and normalized time in `tz`.
///
/// Fails on timestamps chrono cannot represent, reporting the 1-based row.
pub fn enrich(pings: Vec<RawPing>, tz: Tz) -> Result<Vec<EnrichedPing>> {
    let mut localized = Vec::with_capacity(pings.len());
    for (i, ping) in pings.into_iter().enumerate() {
        let local = tz
            .timestamp_opt(ping.timestamp, 0)
            .single()
            .ok_or_else(|| InferenceError::Ingest {
                line: i + 1,
                reason: format!("timestamp {} out of range", ping.timestamp),
            })?;
        localized.push((ping, local));
    }

    let Some(first_date) = localized.iter().map(|(_, dt)| dt.date_naive()).min() else {
        return Ok(Vec::new());
    };
    let min_timestamp = localized
        .iter()
        .map(|(p, _)| p.timestamp)
        .min()
        .unwrap_or_default();
    // Midnight may not exist on a DST transition day; fall back to the first ping
    let origin = first_date
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
        .map_or(min_timestamp, |dt| dt.timestamp());

    Ok(localized
        .into_iter()
        .map(|(raw, local)| EnrichedPing {
            weekday: local.weekday().num_days_from_monday() as u8,
            day_of_year: local.ordinal() as u16,
            speed_kmh: speed_to_kmh(raw.speed),
            timestamp_norm: raw.timestamp - origin,
            raw,
        })
        .collect())
}

/// Keep pings with a valid position, slower than `max_speed_kmh` and with
/// precision under `max_horizontal_precision`.
pub fn filter(pings: Vec<EnrichedPing>, config: &FilterConfig) -> Vec<EnrichedPing> {
    let before = pings.len();
    let (valid, invalid): (Vec<EnrichedPing>, Vec<EnrichedPing>) = pings
        .into_iter()
        .partition(|p| GpsPoint::new(p.raw.latitude, p.raw.longitude).is_valid());
    if !invalid.is_empty() {
        debug!(
            "[Ingest] dropped {} pings with non-finite or out-of-range positions",
            invalid.len()
        );
    }

    let kept: Vec<EnrichedPing> = valid
        .into_iter()
        .filter(|p| {
            p.speed_kmh < config.max_speed_kmh
                && p.raw.horizontal_precision < config.max_horizontal_precision
        })
        .collect();

    debug!("[Ingest] filter kept {} of {} pings", kept.len(), before);
    kept
}

/// Group point records by user, preserving each user's input order.
pub fn split_by_user(points: Vec<PointRecord>) -> BTreeMap<String, Vec<PointRecord>> {
    let mut by_user: BTreeMap<String, Vec<PointRecord>> = BTreeMap::new();
    for p in points {
        by_user.entry(p.user_id.clone()).or_default().push(p);
    }
    by_user
}

/// Read, enrich and filter a CSV file into per-user point records.
pub fn load_points(
    path: &Path,
    tz: Tz,
    filter_config: &FilterConfig,
) -> Result<BTreeMap<String, Vec<PointRecord>>> {
    let raw = read_csv(path)?;
    let enriched = enrich(raw, tz)?;
    let kept = filter(enriched, filter_config);

    let by_user = split_by_user(kept.iter().map(EnrichedPing::to_point_record).collect());
    info!(
        "[Ingest] {} stationary pings for {} users from {}",
        kept.len(),
        by_user.len(),
        path.display()
    );
    Ok(by_user)
}
