//! homeloc CLI - infer home and work locations from a CSV of GPS pings
//!
//! Usage:
//!   homeloc-cli infer <csv> [--user <id>] [--timezone <tz>] [--eps <km>] [--min-samples <n>]
//!   homeloc-cli demo [--seed <n>] [--points <n>]
//!
//! Prints one JSON object per user on stdout. Logging goes to stderr and is
//! controlled with `RUST_LOG` or `--verbose`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use homeloc::{
    ClusterConfig, DaySets, FilterConfig, InferenceConfig, MetricKind, PointRecord,
    infer_home_work,
    ingest::load_points,
    synthetic::VisitScenario,
};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Parser)]
#[command(name = "homeloc-cli")]
#[command(about = "Infer home and work locations from GPS pings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run inference on a header-less ping CSV
    Infer {
        /// CSV file: user_id,timestamp,latitude,longitude,horizontal_precision,speed,crc32_hash
        csv: PathBuf,

        /// Only process this user
        #[arg(short, long)]
        user: Option<String>,

        /// IANA timezone used to derive weekdays and days of year
        #[arg(short, long, default_value = "UTC")]
        timezone: String,

        /// JSON file with `clustering`, `days` and `filter` sections
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Neighbourhood radius in kilometers
        #[arg(long)]
        eps: Option<f64>,

        /// Minimum neighbourhood size for a core point
        #[arg(long)]
        min_samples: Option<usize>,

        /// Distance metric: "haversine" or "accuracy"
        #[arg(long)]
        metric: Option<MetricKind>,

        /// Business days of year (comma separated)
        #[arg(long, value_delimiter = ',', requires = "weekend")]
        weekdays: Vec<u16>,

        /// Weekend days of year (comma separated)
        #[arg(long, value_delimiter = ',', requires = "weekdays")]
        weekend: Vec<u16>,

        /// Use the built-in two-week reference window for day sets
        #[arg(long)]
        reference_window: bool,
    },

    /// Run inference on a generated commuter scenario
    Demo {
        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Pings per place
        #[arg(long, default_value = "500")]
        points: usize,
    },
}

/// Optional settings file; every section falls back to its defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    clustering: ClusterConfig,
    days: Option<DaySets>,
    filter: FilterConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let outcome = match cli.command {
        Commands::Infer {
            csv,
            user,
            timezone,
            config,
            eps,
            min_samples,
            metric,
            weekdays,
            weekend,
            reference_window,
        } => load_file_config(config.as_deref()).and_then(|mut file_config| {
            if let Some(eps) = eps {
                file_config.clustering.eps_km = eps;
            }
            if let Some(min_samples) = min_samples {
                file_config.clustering.min_samples = min_samples;
            }
            if let Some(metric) = metric {
                file_config.clustering.metric = metric;
            }
            if !weekdays.is_empty() {
                file_config.days = Some(DaySets::new(weekdays, weekend));
            } else if reference_window && file_config.days.is_none() {
                file_config.days = Some(DaySets::reference_window());
            }
            run_infer(&csv, user.as_deref(), &timezone, &file_config)
        }),
        Commands::Demo { seed, points } => {
            run_demo(seed, points);
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn load_file_config(path: Option<&Path>) -> Result<FileConfig, String> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("invalid config {}: {}", path.display(), e))
}

fn run_infer(
    csv: &Path,
    user_filter: Option<&str>,
    timezone: &str,
    file_config: &FileConfig,
) -> Result<(), String> {
    let tz: Tz = timezone
        .parse()
        .map_err(|e| format!("unknown timezone '{}': {}", timezone, e))?;
    file_config
        .clustering
        .validate()
        .map_err(|e| e.to_string())?;

    let by_user = load_points(csv, tz, &file_config.filter).map_err(|e| e.to_string())?;

    let mut processed = 0;
    for (user_id, points) in &by_user {
        if user_filter.is_some_and(|u| u != user_id.as_str()) {
            continue;
        }
        processed += 1;

        let days = file_config
            .days
            .clone()
            .unwrap_or_else(|| DaySets::from_points(points));
        let config = InferenceConfig::new(file_config.clustering.clone(), days);
        println!("{}", infer_to_json(user_id, points, &config));
    }

    if processed == 0 {
        warn!("No matching users in {}", csv.display());
    }
    Ok(())
}

fn run_demo(seed: u64, points_per_place: usize) {
    let scenario = VisitScenario::commuter(points_per_place, seed);
    let points = scenario.generate("demo");
    info!(
        "Generated {} pings around {} places (seed {})",
        points.len(),
        scenario.places.len(),
        seed
    );

    let config = InferenceConfig::new(
        ClusterConfig::new(0.05, 50),
        DaySets::reference_window(),
    );
    println!("{}", infer_to_json("demo", &points, &config));
}

fn infer_to_json(user_id: &str, points: &[PointRecord], config: &InferenceConfig) -> Value {
    match infer_home_work(points, config) {
        Ok(inference) => {
            let hw = &inference.home_work;
            json!({
                "user_id": user_id,
                "points": points.len(),
                "clusters": inference.clustering.n_clusters,
                "noise": inference.clustering.noise_count(),
                "home": hw.home,
                "work": hw.work,
                "degenerate": hw.is_degenerate(),
            })
        }
        Err(e) => json!({
            "user_id": user_id,
            "points": points.len(),
            "error": e.to_string(),
        }),
    }
}
