use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::predict::{GroundStation, PassOptions};
use crate::sgpsdp::ChecksumPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid station coordinates: {0}")]
    InvalidStation(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub predict: PredictConfig,
    #[serde(default = "default_tle_dir")]
    pub tle_dir: PathBuf,
}

fn default_tle_dir() -> PathBuf {
    PathBuf::from("./tle")
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    pub min_elevation_deg: f64,
    pub num_entries: u32,
    #[serde(deserialize_with = "humantime_duration")]
    pub resolution: Duration,
    #[serde(deserialize_with = "humantime_duration")]
    pub look_ahead: Duration,
    pub num_passes: usize,
    pub twilight_threshold_deg: f64,
    pub checksum_policy: ChecksumPolicy,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            min_elevation_deg: 5.0,
            num_entries: 20,
            resolution: Duration::from_secs(10),
            look_ahead: Duration::from_secs(3 * 86400),
            num_passes: 10,
            twilight_threshold_deg: -6.0,
            checksum_policy: ChecksumPolicy::Strict,
        }
    }
}

impl PredictConfig {
    pub fn pass_options(&self) -> PassOptions {
        PassOptions {
            min_el: self.min_elevation_deg,
            num_entries: self.num_entries,
            resolution: self.resolution,
            twilight_threshold: self.twilight_threshold_deg,
        }
    }

    /// Look-ahead window in days, the unit the pass search works in.
    pub fn look_ahead_days(&self) -> f64 {
        self.look_ahead.as_secs_f64() / 86400.0
    }
}

fn humantime_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.ground_station()?;
        Ok(config)
    }

    pub fn ground_station(&self) -> Result<GroundStation, ConfigError> {
        let name = self.station.name.as_deref().unwrap_or("Default");
        GroundStation::from_coordinates(name, &self.station.coordinates, Some(self.station.altitude_m))
            .ok_or_else(|| ConfigError::InvalidStation(self.station.coordinates.clone()))
    }
}
