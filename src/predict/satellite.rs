use serde::Serialize;
use strum_macros::Display;

use crate::predict::GroundStation;
use crate::sgpsdp::consts::{AE, PI, PIO2, TWOPI, XKMPER, XMNPDA};
use crate::sgpsdp::math::{convert_sat_state, degrees};
use crate::sgpsdp::observer::{calculate_obs, lat_lon_alt, ra_dec};
use crate::sgpsdp::{
    select_ephemeris, Ephemeris, OrbitState, OrbitalElements, Sdp4, SelectedElements, Sgp4,
    TleError, Vector,
};

const GEO_MEAN_MOTION: f64 = 1.0027;
const GEO_TOLERANCE: f64 = 0.0002;
const DECAY_MEAN_MOTION: f64 = 16.666666;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitType {
    #[default]
    Unknown,
    #[strum(to_string = "GEO")]
    Geo,
    Decayed,
}

/// Propagator lifecycle of a satellite.
#[derive(Debug, Clone)]
pub enum ModelState {
    Uninitialized,
    NearEarthReady(Sgp4),
    DeepSpaceReady(Box<Sdp4>),
}

/// Kinematic output of the last [`Satellite::calc`].
///
/// Angles are degrees, distances km and velocities km/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Observation {
    pub jul_utc: f64,
    /// Minutes since epoch
    pub tsince: f64,
    pub az: f64,
    pub el: f64,
    pub range: f64,
    pub range_rate: f64,
    pub ra: f64,
    pub dec: f64,
    pub ssplat: f64,
    pub ssplon: f64,
    pub alt: f64,
    pub velo: f64,
    /// Mean anomaly in 0..256 units
    pub ma: f64,
    pub phase: f64,
    pub footprint: f64,
    pub orbit: i64,
}

/// A tracked satellite: its element sets, the propagator built from them
/// and the result of the latest calculation.
///
/// Cloning yields an independent snapshot, propagator caches included.
#[derive(Debug, Clone)]
pub struct Satellite {
    tle: OrbitalElements,
    elements: SelectedElements,
    model: ModelState,
    /// ECI position of the last calculation, km
    pub pos: Vector,
    /// ECI velocity of the last calculation, km/s
    pub vel: Vector,
    /// Raw propagator output of the last calculation
    pub state: OrbitState,
    pub obs: Observation,
}

impl Satellite {
    /// Takes ownership of a freshly parsed element set and selects its
    /// propagation model. The propagator itself is built on first use.
    pub fn new(mut tle: OrbitalElements) -> Result<Self, TleError> {
        let elements = select_ephemeris(&mut tle)?;
        log::debug!(
            "{} ({}): {:?} ephemeris, {:.8} rev/day",
            tle.name,
            tle.catalog_number,
            elements.ephemeris,
            elements.meanmo
        );
        Ok(Self {
            tle,
            elements,
            model: ModelState::Uninitialized,
            pos: Vector::ZERO,
            vel: Vector::ZERO,
            state: OrbitState::default(),
            obs: Observation::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.tle.name
    }

    pub fn catalog_number(&self) -> u32 {
        self.tle.catalog_number
    }

    /// Element set as printed in the TLE.
    pub fn tle(&self) -> &OrbitalElements {
        &self.tle
    }

    pub fn elements(&self) -> &SelectedElements {
        &self.elements
    }

    pub fn model_state(&self) -> &ModelState {
        &self.model
    }

    pub fn is_deep_space(&self) -> bool {
        self.elements.ephemeris == Ephemeris::DeepSpace
    }

    fn init_model(&mut self) {
        if matches!(self.model, ModelState::Uninitialized) {
            self.model = match self.elements.ephemeris {
                Ephemeris::NearEarth => ModelState::NearEarthReady(Sgp4::new(&self.elements)),
                Ephemeris::DeepSpace => ModelState::DeepSpaceReady(Box::new(Sdp4::new(&self.elements))),
            };
        }
    }

    /// Runs the selected propagator at `tsince` minutes from epoch.
    ///
    /// Output is in earth radii and radii per minute.
    pub fn propagate(&mut self, tsince: f64) -> OrbitState {
        self.init_model();
        match &mut self.model {
            ModelState::NearEarthReady(sgp4) => sgp4.propagate(&self.elements, tsince),
            ModelState::DeepSpaceReady(sdp4) => sdp4.propagate(&self.elements, tsince),
            ModelState::Uninitialized => OrbitState::default(),
        }
    }

    /// Propagates to `jul_utc` and derives everything seen from `qth`.
    pub fn calc(&mut self, qth: &GroundStation, jul_utc: f64) -> Observation {
        let tsince = (jul_utc - self.elements.jul_epoch) * XMNPDA;
        let state = self.propagate(tsince);

        let mut pos = state.pos;
        let mut vel = state.vel;
        convert_sat_state(&mut pos, &mut vel);

        let mut observer = qth.geodetic();
        let look = calculate_obs(jul_utc, &pos, &vel, &mut observer);
        let sky = ra_dec(jul_utc, &look, &observer);
        let sub = lat_lon_alt(jul_utc, &pos);

        let phase = degrees(state.phase);
        let age = jul_utc - self.elements.jul_epoch;
        let el = &self.elements;
        let orbit = ((el.xno * XMNPDA / TWOPI + age * el.bstar * AE) * age + (el.xmo + el.omegao) / TWOPI)
            .floor() as i64
            + el.revnum as i64;

        self.pos = pos;
        self.vel = vel;
        self.state = state;
        self.obs = Observation {
            jul_utc,
            tsince,
            az: degrees(look.az),
            el: degrees(look.el),
            range: look.range,
            range_rate: look.range_rate,
            ra: degrees(sky.ra),
            dec: degrees(sky.dec),
            ssplat: degrees(sub.lat),
            ssplon: degrees(sub.lon),
            alt: sub.alt,
            velo: vel.w,
            ma: phase * 256.0 / 360.0,
            phase,
            footprint: 12756.33 * (XKMPER / (XKMPER + sub.alt)).acos(),
            orbit,
        };
        self.obs
    }

    pub fn is_geostationary(&self) -> bool {
        (self.elements.meanmo - GEO_MEAN_MOTION).abs() < GEO_TOLERANCE
    }

    /// True when the drag term predicts re-entry before `jul_utc`.
    pub fn is_decayed(&self, jul_utc: f64) -> bool {
        let ndot = self.tle.xndt2o.abs();
        self.elements.jul_epoch + (DECAY_MEAN_MOTION - self.elements.meanmo) / (10.0 * ndot) < jul_utc
    }

    pub fn orbit_type(&self, jul_utc: f64) -> OrbitType {
        if self.is_geostationary() {
            OrbitType::Geo
        } else if self.is_decayed(jul_utc) {
            OrbitType::Decayed
        } else {
            OrbitType::Unknown
        }
    }

    /// Whether the satellite can ever rise above the horizon of `qth`.
    ///
    /// Geostationary and decayed objects never do. Otherwise only
    /// inclination and apogee are considered, so a true result does not
    /// guarantee a pass.
    pub fn has_aos(&self, qth: &GroundStation, jul_utc: f64) -> bool {
        let meanmo = self.elements.meanmo;
        if meanmo == 0.0 || self.orbit_type(jul_utc) != OrbitType::Unknown {
            return false;
        }

        let mut lin = self.elements.xincl;
        if lin >= PIO2 {
            lin = PI - lin;
        }
        let sma = 331.25 * ((1440.0 / meanmo).ln() * (2.0 / 3.0)).exp();
        let apogee = sma * (1.0 + self.elements.eo) - XKMPER;

        (XKMPER / (apogee + XKMPER)).acos() + lin > qth.lat_rad().abs()
    }
}
