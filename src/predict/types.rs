use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::predict::visibility::Visibility;
use crate::predict::GroundStation;
use crate::sgpsdp::time::datetime_from_julian;
use crate::sgpsdp::Vector;

/// Information about a single satellite from TLE
#[derive(Debug, Clone, Serialize)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u32,
    pub tle_source: String,
}

/// One sample along a pass. Times are Julian dates, angles degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassDetail {
    pub time: f64,
    pub pos: Vector,
    pub vel: Vector,
    pub velo: f64,
    pub az: f64,
    pub el: f64,
    pub range: f64,
    pub range_rate: f64,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub ma: f64,
    pub phase: f64,
    pub footprint: f64,
    pub vis: Visibility,
    pub orbit: i64,
}

/// Which visibility classes occurred anywhere in a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisibilitySummary {
    pub visible: bool,
    pub daylight: bool,
    pub eclipsed: bool,
}

impl VisibilitySummary {
    pub fn record(&mut self, vis: Visibility) {
        match vis {
            Visibility::Visible => self.visible = true,
            Visibility::Daylight => self.daylight = true,
            Visibility::Eclipsed => self.eclipsed = true,
            Visibility::None => {}
        }
    }
}

/// Three characters, `V`, `D` and `E` in that order, `-` where absent.
impl fmt::Display for VisibilitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            flag(self.visible, 'V'),
            flag(self.daylight, 'D'),
            flag(self.eclipsed, 'E')
        )
    }
}

/// A predicted pass over a ground station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pass {
    pub satellite: String,
    pub norad_id: u32,
    pub aos: f64,
    pub tca: f64,
    pub los: f64,
    pub max_el: f64,
    pub aos_az: f64,
    pub los_az: f64,
    pub maxel_az: f64,
    /// Orbit number at AOS
    pub orbit: i64,
    pub vis: VisibilitySummary,
    pub details: Vec<PassDetail>,
    /// Station the pass was computed for
    pub qth: GroundStation,
}

impl Pass {
    pub fn duration_days(&self) -> f64 {
        self.los - self.aos
    }
}

/// Export form of a [`Pass`] with UTC timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub satellite: String,
    pub norad_id: u32,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub tca: DateTime<Utc>,
    pub max_elevation_deg: f64,
    pub aos_azimuth_deg: f64,
    pub los_azimuth_deg: f64,
    pub tca_azimuth_deg: f64,
    pub duration_seconds: i64,
    pub orbit_number: i64,
    pub visibility: String,
}

impl From<&Pass> for PassReport {
    fn from(pass: &Pass) -> Self {
        let aos = datetime_from_julian(pass.aos);
        let los = datetime_from_julian(pass.los);
        Self {
            satellite: pass.satellite.clone(),
            norad_id: pass.norad_id,
            aos,
            los,
            tca: datetime_from_julian(pass.tca),
            max_elevation_deg: round2(pass.max_el),
            aos_azimuth_deg: round2(pass.aos_az),
            los_azimuth_deg: round2(pass.los_az),
            tca_azimuth_deg: round2(pass.maxel_az),
            duration_seconds: (los - aos).num_seconds(),
            orbit_number: pass.orbit,
            visibility: pass.vis.to_string(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_characters() {
        let mut vis = VisibilitySummary::default();
        assert_eq!(vis.to_string(), "---");
        vis.record(Visibility::Eclipsed);
        vis.record(Visibility::None);
        assert_eq!(vis.to_string(), "--E");
        vis.record(Visibility::Visible);
        vis.record(Visibility::Daylight);
        assert_eq!(vis.to_string(), "VDE");
    }

    #[test]
    fn report_rounds_and_timestamps() {
        let pass = Pass {
            satellite: "TEST".into(),
            norad_id: 1,
            aos: 2440588.0,
            tca: 2440588.0 + 300.0 / 86400.0,
            los: 2440588.0 + 600.0 / 86400.0,
            max_el: 42.4567,
            aos_az: 10.001,
            los_az: 200.129,
            maxel_az: 100.0,
            orbit: 1234,
            vis: VisibilitySummary {
                visible: true,
                daylight: false,
                eclipsed: false,
            },
            details: Vec::new(),
            qth: GroundStation::default(),
        };
        let report = PassReport::from(&pass);
        assert_eq!(report.aos.to_rfc3339(), "1970-01-01T12:00:00+00:00");
        assert_eq!(report.duration_seconds, 600);
        assert_eq!(report.max_elevation_deg, 42.46);
        assert_eq!(report.los_azimuth_deg, 200.13);
        assert_eq!(report.visibility, "V--");
    }
}
