//! Topocentric and geodetic transforms between ECI vectors and a point on
//! the oblate earth.

use serde::Serialize;

use super::consts::{F, MFACTOR, PI, PIO2, TWOPI, XKMPER};
use super::math::{ac_tan, arc_sin, fmod2p, Vector};
use super::time::theta_g_jd;

const LATITUDE_TOLERANCE: f64 = 1E-10;
const MAX_LATITUDE_ITERATIONS: usize = 50;

/// Geodetic coordinates. Latitude and longitude in radians, altitude in km.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Geodetic {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    /// Local sidereal angle of the last transform, radians
    pub theta: f64,
}

impl Geodetic {
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Geodetic {
            lat,
            lon,
            alt,
            theta: 0.0,
        }
    }
}

/// Look angles from an observer. Angles in radians, range in km and range
/// rate in km/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ObsSet {
    pub az: f64,
    pub el: f64,
    pub range: f64,
    pub range_rate: f64,
}

/// Topocentric right ascension and declination, radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RaDec {
    pub ra: f64,
    pub dec: f64,
}

/// ECI position (km) and velocity (km/s) of an observer at `jd`.
pub fn user_pos_vel(jd: f64, geodetic: &mut Geodetic) -> (Vector, Vector) {
    geodetic.theta = fmod2p(theta_g_jd(jd) + geodetic.lon);
    let sin_lat = geodetic.lat.sin();
    let c = 1.0 / (1.0 + F * (F - 2.0) * sin_lat * sin_lat).sqrt();
    let sq = (1.0 - F) * (1.0 - F) * c;
    let achcp = (XKMPER * c + geodetic.alt) * geodetic.lat.cos();

    let pos = Vector::new(
        achcp * geodetic.theta.cos(),
        achcp * geodetic.theta.sin(),
        (XKMPER * sq + geodetic.alt) * sin_lat,
    );
    let vel = Vector::new(-MFACTOR * pos.y, MFACTOR * pos.x, 0.0);
    (pos, vel)
}

/// Sub-satellite point of an ECI position (km) at `jd`.
///
/// Latitude is found iteratively on the oblate spheroid. Longitude is
/// returned in (-π, π].
pub fn lat_lon_alt(jd: f64, pos: &Vector) -> Geodetic {
    let theta = ac_tan(pos.y, pos.x);
    let mut lon = fmod2p(theta - theta_g_jd(jd));
    let r = (pos.x * pos.x + pos.y * pos.y).sqrt();
    let e2 = F * (2.0 - F);

    let mut lat = ac_tan(pos.z, r);
    let mut c;
    let mut iterations = 0;
    loop {
        let phi = lat;
        let sin_phi = phi.sin();
        c = 1.0 / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        lat = ac_tan(pos.z + XKMPER * c * e2 * sin_phi, r);
        iterations += 1;
        if (lat - phi).abs() < LATITUDE_TOLERANCE || iterations >= MAX_LATITUDE_ITERATIONS {
            break;
        }
    }

    let alt = r / lat.cos() - XKMPER * c;
    if lat > PIO2 {
        lat -= TWOPI;
    }
    if lon > PI {
        lon -= TWOPI;
    }

    Geodetic {
        lat,
        lon,
        alt,
        theta,
    }
}

/// Azimuth, elevation, range and range rate of a satellite at ECI `pos`
/// (km) and `vel` (km/s) seen from `geodetic`.
pub fn calculate_obs(jd: f64, pos: &Vector, vel: &Vector, geodetic: &mut Geodetic) -> ObsSet {
    let (obs_pos, obs_vel) = user_pos_vel(jd, geodetic);

    let range = pos.sub(&obs_pos);
    let rgvel = vel.sub(&obs_vel);

    let (sin_lat, cos_lat) = geodetic.lat.sin_cos();
    let (sin_theta, cos_theta) = geodetic.theta.sin_cos();
    let top_s = sin_lat * cos_theta * range.x + sin_lat * sin_theta * range.y - cos_lat * range.z;
    let top_e = -sin_theta * range.x + cos_theta * range.y;
    let top_z = cos_lat * cos_theta * range.x + cos_lat * sin_theta * range.y + sin_lat * range.z;

    let mut az = (-top_e / top_s).atan();
    if top_s > 0.0 {
        az += PI;
    }
    if az < 0.0 {
        az += TWOPI;
    }

    ObsSet {
        az,
        el: arc_sin(top_z / range.w),
        range: range.w,
        range_rate: range.dot(&rgvel) / range.w,
    }
}

/// Right ascension and declination of the direction `obs` as seen from
/// `geodetic` at `jd`.
pub fn ra_dec(jd: f64, obs: &ObsSet, geodetic: &Geodetic) -> RaDec {
    let theta = fmod2p(theta_g_jd(jd) + geodetic.lon);
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = geodetic.lat.sin_cos();

    let lxh = -obs.az.cos() * obs.el.cos();
    let lyh = obs.az.sin() * obs.el.cos();
    let lzh = obs.el.sin();

    let (sx, ex, zx) = (sin_phi * cos_theta, -sin_theta, cos_theta * cos_phi);
    let (sy, ey, zy) = (sin_phi * sin_theta, cos_theta, sin_theta * cos_phi);
    let (sz, ez, zz) = (-cos_phi, 0.0, sin_phi);

    let lx = sx * lxh + ex * lyh + zx * lzh;
    let ly = sy * lxh + ey * lyh + zy * lzh;
    let lz = sz * lxh + ez * lyh + zz * lzh;

    let dec = arc_sin(lz);
    let cos_delta = (1.0 - lz * lz).sqrt();
    let ra = fmod2p(ac_tan(ly / cos_delta, lx / cos_delta));

    RaDec { ra, dec }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgpsdp::math::radians;

    const JD: f64 = 2460000.5;

    #[test]
    fn observer_position_round_trips_through_lat_lon_alt() {
        let mut qth = Geodetic::new(radians(55.6867), radians(12.5701), 0.01);
        let (pos, vel) = user_pos_vel(JD, &mut qth);
        assert!((pos.w - 6363.0).abs() < 5.0, "radius {}", pos.w);
        assert_eq!(vel.z, 0.0);

        let back = lat_lon_alt(JD, &pos);
        assert!((back.lat - qth.lat).abs() < 1e-8);
        assert!((back.lon - qth.lon).abs() < 1e-8);
        assert!((back.alt - qth.alt).abs() < 1e-5);
    }

    #[test]
    fn western_longitude_is_negative() {
        let mut qth = Geodetic::new(radians(-33.9), radians(-118.4), 0.0);
        let (pos, _) = user_pos_vel(JD, &mut qth);
        let back = lat_lon_alt(JD, &pos);
        assert!((back.lon - radians(-118.4)).abs() < 1e-8);
        assert!(back.lon > -PI && back.lon <= PI);
    }

    #[test]
    fn point_straight_up_is_at_zenith() {
        let mut qth = Geodetic::new(radians(45.0), radians(10.0), 0.0);
        let (obs_pos, obs_vel) = user_pos_vel(JD, &mut qth);
        // Geocentric radial, close to but not exactly the local vertical.
        let mut up = obs_pos;
        up.normalize();
        let sat = obs_pos.add(&up.scalar_multiply(1000.0));

        let obs = calculate_obs(JD, &sat, &obs_vel, &mut qth);
        assert!(obs.el > radians(89.0), "el {}", obs.el.to_degrees());
        assert!((obs.range - 1000.0).abs() < 1e-6);
        assert!(obs.range_rate.abs() < 1e-9);
    }

    #[test]
    fn azimuth_north_and_north_east() {
        let mut qth = Geodetic::new(0.0, 0.0, 0.0);
        let (obs_pos, obs_vel) = user_pos_vel(JD, &mut qth);
        let theta = qth.theta;

        let north = obs_pos.add(&Vector::new(0.0, 0.0, 500.0));
        let obs = calculate_obs(JD, &north, &obs_vel, &mut qth);
        assert!(obs.az.abs() < 1e-9 || (obs.az - TWOPI).abs() < 1e-9);

        let north_east =
            obs_pos.add(&Vector::new(-theta.sin() * 500.0, theta.cos() * 500.0, 500.0));
        let obs = calculate_obs(JD, &north_east, &obs_vel, &mut qth);
        assert!((obs.az - PI / 4.0).abs() < 1e-9);
        assert!(obs.el.abs() < 1e-9);
    }

    #[test]
    fn zenith_declination_equals_latitude() {
        let qth = Geodetic::new(radians(30.0), radians(0.0), 0.0);
        let zenith = ObsSet {
            az: 0.0,
            el: PIO2,
            range: 1.0,
            range_rate: 0.0,
        };
        let rd = ra_dec(JD, &zenith, &qth);
        assert!((rd.dec - radians(30.0)).abs() < 1e-9);
        // Right ascension of the zenith is the local sidereal time.
        let lst = fmod2p(theta_g_jd(JD) + qth.lon);
        assert!((rd.ra - lst).abs() < 1e-9);
    }
}
