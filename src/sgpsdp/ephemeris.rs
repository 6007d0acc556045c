use serde::Serialize;

use super::consts::{AE, CK2, DE2RA, DEEP_SPACE_PERIOD_DAYS, TOTHRD, TWOPI, XKE, XMNPDA};
use super::error::TleError;
use super::time::julian_date_of_epoch;
use super::tle::OrbitalElements;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ephemeris {
    /// SGP4, orbital period below 225 minutes
    NearEarth,
    /// SDP4
    DeepSpace,
}

/// Element set in propagator units: radians, radians per minute and
/// earth radii. This is the only form the propagators accept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedElements {
    /// TLE epoch, YYDDD.FFFFFFFF
    pub epoch: f64,
    pub jul_epoch: f64,
    pub xndt2o: f64,
    pub xndd6o: f64,
    pub bstar: f64,
    pub xincl: f64,
    pub xnodeo: f64,
    pub eo: f64,
    pub omegao: f64,
    pub xmo: f64,
    /// Mean motion, rad/min
    pub xno: f64,
    /// Mean motion as given in the TLE, rev/day
    pub meanmo: f64,
    pub revnum: u32,
    pub ephemeris: Ephemeris,
}

/// Converts the raw record to propagator units and picks SGP4 or SDP4.
///
/// The raw record is flagged as converted; a second call on the same record
/// fails with [`TleError::AlreadyConverted`] and leaves it untouched.
pub fn select_ephemeris(raw: &mut OrbitalElements) -> Result<SelectedElements, TleError> {
    if raw.converted {
        return Err(TleError::AlreadyConverted);
    }
    raw.converted = true;

    let temp = TWOPI / XMNPDA / XMNPDA;
    let xno = raw.xno * temp * XMNPDA;
    let xincl = raw.xincl * DE2RA;

    // Recover the original mean motion to get the anomalistic period.
    let a1 = (XKE / xno).powf(TOTHRD);
    let r1 = xincl.cos();
    let dd1 = 1.0 - raw.eo * raw.eo;
    let temp = CK2 * 1.5 * (r1 * r1 * 3.0 - 1.0) / dd1.powf(1.5);
    let del1 = temp / (a1 * a1);
    let ao = a1 * (1.0 - del1 * (TOTHRD * 0.5 + del1 * (del1 * 1.654320987654321 + 1.0)));
    let delo = temp / (ao * ao);
    let xnodp = xno / (delo + 1.0);

    let ephemeris = if TWOPI / xnodp / XMNPDA >= DEEP_SPACE_PERIOD_DAYS {
        Ephemeris::DeepSpace
    } else {
        Ephemeris::NearEarth
    };

    let temp = TWOPI / XMNPDA / XMNPDA;
    Ok(SelectedElements {
        epoch: raw.epoch,
        jul_epoch: julian_date_of_epoch(raw.epoch),
        xndt2o: raw.xndt2o * temp,
        xndd6o: raw.xndd6o * temp / XMNPDA,
        bstar: raw.bstar / AE,
        xincl,
        xnodeo: raw.xnodeo * DE2RA,
        eo: raw.eo,
        omegao: raw.omegao * DE2RA,
        xmo: raw.xmo * DE2RA,
        xno,
        meanmo: raw.xno,
        revnum: raw.revnum,
        ephemeris,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgpsdp::tle::convert_satellite_data;

    fn elements(line2: &str) -> OrbitalElements {
        let line1 = "1 88888U          80275.98708465  .00073094  13844-3  66816-4 0     9";
        convert_satellite_data(line1, line2).unwrap()
    }

    #[test]
    fn low_orbit_uses_sgp4() {
        let mut raw =
            elements("2 88888  72.8435 115.9689 0086731  52.6988 110.5714 16.05824518   103");
        let sel = select_ephemeris(&mut raw).unwrap();
        assert_eq!(sel.ephemeris, Ephemeris::NearEarth);
        assert!((sel.xincl - 72.8435 * DE2RA).abs() < 1e-12);
        assert_eq!(sel.meanmo, 16.05824518);
    }

    #[test]
    fn long_period_uses_sdp4() {
        let mut raw =
            elements("2 88888  46.7916 230.4354 7318036  47.4722  10.4117  2.28537848    13");
        assert_eq!(select_ephemeris(&mut raw).unwrap().ephemeris, Ephemeris::DeepSpace);
    }

    #[test]
    fn period_boundary() {
        // 6.4 rev/day is exactly 225 minutes before the J2 correction, which
        // lengthens the anomalistic period at low inclination.
        let mut just_below =
            elements("2 88888   0.0000   0.0000 0001000   0.0000   0.0000  6.50000000    13");
        let mut above =
            elements("2 88888   0.0000   0.0000 0001000   0.0000   0.0000  6.30000000    13");
        assert_eq!(select_ephemeris(&mut just_below).unwrap().ephemeris, Ephemeris::NearEarth);
        assert_eq!(select_ephemeris(&mut above).unwrap().ephemeris, Ephemeris::DeepSpace);
    }

    #[test]
    fn conversion_happens_once() {
        let mut raw =
            elements("2 88888  72.8435 115.9689 0086731  52.6988 110.5714 16.05824518   103");
        let first = select_ephemeris(&mut raw).unwrap();
        assert!(raw.is_converted());
        assert_eq!(select_ephemeris(&mut raw), Err(TleError::AlreadyConverted));
        // Raw angles stay in degrees.
        assert_eq!(raw.xincl, 72.8435);
        assert!((first.xincl - 72.8435 * DE2RA).abs() < 1e-12);
    }
}
