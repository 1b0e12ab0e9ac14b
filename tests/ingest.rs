//! Tests for ingest module

use std::fs;

use chrono_tz::Tz;
use homeloc::ingest::*;
use homeloc::{ClusterConfig, FilterConfig, InferenceError, PointRecord, cluster_points};

const SAMPLE: &str = "\
1,1516000000,48.85,2.35,10,0.5,a1b2c3d4
1,1516057200,48.85,2.35,70,0.2,a1b2c3d4
2,1516402800,40.71,-74.0,20,3.0,e5f6a7b8
2,1516320000,40.71,-74.0,20,1.0,e5f6a7b8
";

#[test]
fn test_read_records() {
    let pings = read_records(SAMPLE.as_bytes()).unwrap();
    assert_eq!(pings.len(), 4);
    assert_eq!(pings[0].user_id, "1");
    assert_eq!(pings[0].timestamp, 1_516_000_000);
    assert_eq!(pings[2].longitude, -74.0);
    assert_eq!(pings[3].crc32_hash, "e5f6a7b8");
}

#[test]
fn test_missing_hash_column_defaults() {
    let pings = read_records("9, 1516000000, 1.0, 2.0, 5, 0.1\n".as_bytes()).unwrap();
    assert_eq!(pings[0].user_id, "9");
    assert_eq!(pings[0].crc32_hash, "");
}

#[test]
fn test_malformed_row_reports_line() {
    let data = "1,1516000000,48.85,2.35,10,0.5,x\n1,yesterday,48.85,2.35,10,0.5,x\n";
    let err = read_records(data.as_bytes()).unwrap_err();
    match err {
        InferenceError::Ingest { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_enrich_utc() {
    let enriched = enrich(read_records(SAMPLE.as_bytes()).unwrap(), Tz::UTC).unwrap();

    assert_eq!(enriched[0].weekday, 0);
    assert_eq!(enriched[0].day_of_year, 15);
    assert_eq!(enriched[1].day_of_year, 15);
    assert_eq!(enriched[2].weekday, 4);
    assert_eq!(enriched[2].day_of_year, 19);
    // Midnight UTC of 2018-01-15 is 1515974400
    assert_eq!(enriched[0].timestamp_norm, 25_600);
    assert!((enriched[0].speed_kmh - 1.8).abs() < 1e-12);
}

#[test]
fn test_enrich_local_timezone_shifts_days() {
    let enriched = enrich(read_records(SAMPLE.as_bytes()).unwrap(), Tz::Europe__Paris).unwrap();

    // 23:00 UTC is already the next day in Paris
    assert_eq!(enriched[1].weekday, 1);
    assert_eq!(enriched[1].day_of_year, 16);
    assert_eq!(enriched[2].weekday, 5);
    assert_eq!(enriched[2].day_of_year, 20);
    // Local midnight of 2018-01-15 is 23:00 UTC the day before
    assert_eq!(enriched[0].timestamp_norm, 29_200);
}

#[test]
fn test_enrich_empty() {
    assert!(enrich(Vec::new(), Tz::UTC).unwrap().is_empty());
}

#[test]
fn test_filter_thresholds() {
    let enriched = enrich(read_records(SAMPLE.as_bytes()).unwrap(), Tz::UTC).unwrap();
    let kept = filter(enriched, &FilterConfig::default());

    // Row 2 is too imprecise, row 3 too fast
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].raw.timestamp, 1_516_000_000);
    assert_eq!(kept[1].raw.timestamp, 1_516_320_000);
}

#[test]
fn test_filter_is_strict() {
    let data = "1,1516000000,0,0,66,0.0,x\n1,1516000000,0,0,65.9,0.0,x\n";
    let enriched = enrich(read_records(data.as_bytes()).unwrap(), Tz::UTC).unwrap();
    let kept = filter(enriched, &FilterConfig::default());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].raw.horizontal_precision, 65.9);
}

#[test]
fn test_filter_drops_invalid_positions() {
    let data = "\
1,1516000000,nan,2.35,10,0.5,x
1,1516000000,48.85,inf,10,0.5,x
1,1516000000,95.0,2.35,10,0.5,x
1,1516000000,48.85,2.35,10,0.5,x
";
    let pings = read_records(data.as_bytes()).unwrap();
    assert!(pings[0].latitude.is_nan());

    let kept = filter(enrich(pings, Tz::UTC).unwrap(), &FilterConfig::default());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].raw.latitude, 48.85);
}

#[test]
fn test_load_points_skips_nan_row_and_clusters() {
    let mut data = String::from("7,1516000000,nan,2.35,10,0.5,x\n");
    for i in 0..30 {
        data.push_str(&format!("7,{},48.85,2.35,10,0.5,x\n", 1_516_000_000 + i * 60));
    }
    let path =
        std::env::temp_dir().join(format!("homeloc-ingest-nan-{}.csv", std::process::id()));
    fs::write(&path, data).unwrap();

    let by_user = load_points(&path, Tz::UTC, &FilterConfig::default()).unwrap();
    fs::remove_file(&path).unwrap();

    let points = &by_user["7"];
    assert_eq!(points.len(), 30);
    let clustering = cluster_points(points, &ClusterConfig::new(0.01, 5)).unwrap();
    assert_eq!(clustering.n_clusters, 1);
}

#[test]
fn test_speed_conversion() {
    assert_eq!(speed_to_kmh(10.0), 36.0);
    assert_eq!(speed_to_kmh(0.0), 0.0);
}

#[test]
fn test_split_by_user() {
    let points = vec![
        PointRecord::new("b", 1.0, 0.0, 5.0, 1, 0),
        PointRecord::new("a", 2.0, 0.0, 5.0, 1, 0),
        PointRecord::new("b", 3.0, 0.0, 5.0, 1, 0),
    ];
    let by_user = split_by_user(points);

    assert_eq!(by_user.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    let b: Vec<f64> = by_user["b"].iter().map(|p| p.latitude).collect();
    assert_eq!(b, vec![1.0, 3.0]);
}

#[test]
fn test_load_points_from_file() {
    let path = std::env::temp_dir().join(format!("homeloc-ingest-{}.csv", std::process::id()));
    fs::write(&path, SAMPLE).unwrap();

    let by_user = load_points(&path, Tz::UTC, &FilterConfig::default()).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(by_user.len(), 2);
    assert_eq!(by_user["1"].len(), 1);
    assert_eq!(by_user["2"][0].day_of_year, 19);
    assert_eq!(by_user["2"][0].weekday, 4);
}

#[test]
fn test_load_points_missing_file() {
    let err = load_points(
        std::path::Path::new("/nonexistent/homeloc.csv"),
        Tz::UTC,
        &FilterConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, InferenceError::Io(_)));
}
