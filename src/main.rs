use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::process::ExitCode;

use pass_o_mat::config::Config;
use pass_o_mat::predict::{
    eclipse_depth, get_current_pass, get_passes, parse_tle_text, sat_visibility, GroundStation,
    Observation, OrbitType, Pass, PassReport, TleEntry, TleLoader, Visibility,
};
use pass_o_mat::sgpsdp::time::julian_from_datetime;
use pass_o_mat::sgpsdp::ChecksumPolicy;
use pass_o_mat::time_expr::TimeExpr;

#[derive(Parser)]
#[command(name = "pass-o-mat")]
#[command(about = "Satellite pass prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every element set in a TLE file
    Validate {
        tle_file: String,
        /// Accept sets whose only fault is a bad checksum
        #[arg(long)]
        lenient: bool,
    },
    /// Predict upcoming passes
    Passes {
        #[arg(short, long)]
        config: String,
        /// Catalog number or name; all loaded satellites when omitted
        #[arg(short, long)]
        satellite: Option<String>,
        /// RFC3339 time, `now` or `T+<duration>`
        #[arg(long, default_value = "now")]
        start: String,
        /// Passes per satellite
        #[arg(short, long)]
        num: Option<usize>,
        #[arg(long)]
        min_elevation: Option<f64>,
        /// Include the sampled track of each pass
        #[arg(long)]
        details: bool,
    },
    /// Show the pass in progress, or the next one
    Current {
        #[arg(short, long)]
        config: String,
        #[arg(short, long)]
        satellite: String,
        #[arg(long, default_value = "now")]
        at: String,
    },
    /// Compute look angles and position at one instant
    Track {
        #[arg(short, long)]
        config: String,
        #[arg(short, long)]
        satellite: String,
        #[arg(long, default_value = "now")]
        at: String,
    },
}

#[derive(Serialize)]
struct PredictResponse<T> {
    passes: Vec<T>,
    satellite_count: usize,
}

#[derive(Serialize)]
struct TrackReport {
    satellite: String,
    norad_id: u32,
    time: DateTime<Utc>,
    orbit_type: OrbitType,
    visibility: Visibility,
    eclipse_depth_deg: f64,
    #[serde(flatten)]
    observation: Observation,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { tle_file, lenient } => validate(&tle_file, lenient),
        Commands::Passes {
            config,
            satellite,
            start,
            num,
            min_elevation,
            details,
        } => passes(&config, satellite.as_deref(), &start, num, min_elevation, details),
        Commands::Current {
            config,
            satellite,
            at,
        } => current(&config, &satellite, &at),
        Commands::Track {
            config,
            satellite,
            at,
        } => track(&config, &satellite, &at),
    }
}

fn validate(path: &str, lenient: bool) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let policy = if lenient {
        ChecksumPolicy::Lenient
    } else {
        ChecksumPolicy::Strict
    };
    let results = parse_tle_text(&content, policy);
    if results.is_empty() {
        eprintln!("No element sets found in {}", path);
        return ExitCode::FAILURE;
    }

    let mut failures = 0;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(el) => println!("  {}: {} ({}) epoch {:.8}", i + 1, el.name, el.catalog_number, el.epoch),
            Err(e) => {
                failures += 1;
                println!("  {}: invalid: {}", i + 1, e);
            }
        }
    }

    println!("{} of {} element sets valid", results.len() - failures, results.len());
    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Loads the config, station and satellites shared by the prediction commands.
fn load(config_path: &str) -> Result<(Config, GroundStation, TleLoader), String> {
    let config = Config::from_file(config_path).map_err(|e| format!("Config error: {}", e))?;
    let station = config.ground_station().map_err(|e| e.to_string())?;
    let mut loader = TleLoader::new(config.tle_dir.clone(), config.predict.checksum_policy);
    loader.load_all().map_err(|e| format!("TLE error: {}", e))?;
    Ok((config, station, loader))
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    TimeExpr::parse(s)
        .map(|t| t.resolve(Utc::now()))
        .map_err(|e| format!("Invalid time '{}': {}", s, e))
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn passes(
    config_path: &str,
    satellite: Option<&str>,
    start: &str,
    num: Option<usize>,
    min_elevation: Option<f64>,
    details: bool,
) -> ExitCode {
    let (config, station, loader) = match load(config_path) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let start = match parse_time(start) {
        Ok(t) => julian_from_datetime(&t),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let entries: Vec<&TleEntry> = match satellite {
        Some(query) => match loader.find(query) {
            Ok(entry) => vec![entry],
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => loader.satellites(),
    };

    let mut opts = config.predict.pass_options();
    if let Some(min_el) = min_elevation {
        opts.min_el = min_el;
    }
    let maxdt = config.predict.look_ahead_days();
    let num = num.unwrap_or(config.predict.num_passes);

    let mut all_passes: Vec<Pass> = entries
        .iter()
        .flat_map(|entry| get_passes(&entry.satellite, &station, &opts, start, maxdt, num))
        .collect();
    all_passes.sort_by(|a, b| a.aos.total_cmp(&b.aos));

    let satellite_count = all_passes.iter().map(|p| p.norad_id).collect::<HashSet<_>>().len();
    if details {
        print_json(&PredictResponse {
            passes: all_passes,
            satellite_count,
        })
    } else {
        print_json(&PredictResponse {
            passes: all_passes.iter().map(PassReport::from).collect(),
            satellite_count,
        })
    }
}

fn current(config_path: &str, satellite: &str, at: &str) -> ExitCode {
    let (config, station, loader) = match load(config_path) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let (entry, t) = match loader.find(satellite).map_err(|e| e.to_string()).and_then(|entry| {
        parse_time(at).map(|t| (entry, julian_from_datetime(&t)))
    }) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match get_current_pass(&entry.satellite, &station, &config.predict.pass_options(), t) {
        Some(pass) => print_json(&pass),
        None => {
            eprintln!("{} never rises above the horizon at {}", entry.info.name, station.name);
            ExitCode::FAILURE
        }
    }
}

fn track(config_path: &str, satellite: &str, at: &str) -> ExitCode {
    let (config, station, loader) = match load(config_path) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let (entry, time) = match loader
        .find(satellite)
        .map_err(|e| e.to_string())
        .and_then(|entry| parse_time(at).map(|t| (entry, t)))
    {
        Ok(found) => found,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let jd = julian_from_datetime(&time);
    let mut sat = entry.satellite.clone();
    let observation = sat.calc(&station, jd);
    let visibility = sat_visibility(&sat, &station, jd, config.predict.twilight_threshold_deg);

    print_json(&TrackReport {
        satellite: entry.info.name.clone(),
        norad_id: entry.info.norad_id,
        time,
        orbit_type: sat.orbit_type(jd),
        visibility,
        eclipse_depth_deg: eclipse_depth(&sat, jd),
        observation,
    })
}
