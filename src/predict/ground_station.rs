use serde::{Deserialize, Serialize};

use crate::sgpsdp::math::radians;
use crate::sgpsdp::Geodetic;

/// Observer location (QTH).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundStation {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Default for GroundStation {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_m: 0.0,
        }
    }
}

impl GroundStation {
    pub fn new(name: impl Into<String>, latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            name: name.into(),
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Parses `"lat, lon"` in decimal degrees. Latitude must lie within
    /// ±90 and longitude within ±180.
    pub fn from_coordinates(name: &str, coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self::new(name, lat, lon, altitude_m.unwrap_or(0.0)))
    }

    pub fn lat_rad(&self) -> f64 {
        radians(self.latitude_deg)
    }

    pub fn lon_rad(&self) -> f64 {
        radians(self.longitude_deg)
    }

    /// Geodetic coordinates in propagator units: radians and km.
    pub fn geodetic(&self) -> Geodetic {
        Geodetic::new(self.lat_rad(), self.lon_rad(), self.altitude_m / 1000.0)
    }
}
