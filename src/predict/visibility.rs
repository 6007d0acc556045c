use serde::Serialize;
use strum_macros::Display;

use crate::predict::satellite::Satellite;
use crate::predict::GroundStation;
use crate::sgpsdp::math::degrees;
use crate::sgpsdp::observer::calculate_obs;
use crate::sgpsdp::solar::{sat_eclipsed, solar_position};
use crate::sgpsdp::Vector;

/// Optical visibility of a satellite from a ground station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    #[strum(to_string = "-")]
    None,
    /// Sunlit satellite above the horizon, station in darkness
    #[strum(to_string = "V")]
    Visible,
    #[strum(to_string = "D")]
    Daylight,
    #[strum(to_string = "E")]
    Eclipsed,
}

/// Classifies the satellite's last computed state at `jul_utc`.
///
/// `twilight_threshold_deg` is the sun elevation below which the station
/// counts as dark.
pub fn sat_visibility(
    sat: &Satellite,
    qth: &GroundStation,
    jul_utc: f64,
    twilight_threshold_deg: f64,
) -> Visibility {
    let mut geodetic = qth.geodetic();
    let sun = solar_position(jul_utc);
    let sun_obs = calculate_obs(jul_utc, &sun, &Vector::ZERO, &mut geodetic);

    let (eclipsed, _) = sat_eclipsed(&sat.pos, &sun);
    if eclipsed {
        return Visibility::Eclipsed;
    }

    if degrees(sun_obs.el) <= twilight_threshold_deg && sat.obs.el >= 0.0 {
        Visibility::Visible
    } else {
        Visibility::Daylight
    }
}

/// How deep the satellite's last computed position sits in the earth's
/// umbra at `jul_utc`, degrees. Zero or more means eclipsed.
pub fn eclipse_depth(sat: &Satellite, jul_utc: f64) -> f64 {
    let (_, depth) = sat_eclipsed(&sat.pos, &solar_position(jul_utc));
    degrees(depth)
}
