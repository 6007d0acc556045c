//! Long-period terms, Kepler's equation and short-period corrections shared
//! by SGP4 and SDP4.

use serde::Serialize;

use super::consts::{CK2, E6A, TWOPI, XKE};
use super::math::{ac_tan, fmod2p, Vector};

/// Osculating state produced by one propagation step.
///
/// Position is in earth radii and velocity in earth radii per minute until
/// [`convert_sat_state`](super::math::convert_sat_state) is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OrbitState {
    pub pos: Vector,
    pub vel: Vector,
    /// Mean anomaly measured from the ascending node, [0, 2π)
    pub phase: f64,
    pub omega: f64,
    pub inclination: f64,
    pub raan: f64,
}

/// Epoch quantities used by the periodic corrections.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PeriodicCoefficients {
    pub cosio: f64,
    pub sinio: f64,
    pub x3thm1: f64,
    pub x1mth2: f64,
    pub x7thm1: f64,
    pub xlcof: f64,
    pub aycof: f64,
}

/// Secularly updated elements entering the periodic corrections.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SecularElements {
    pub a: f64,
    pub e: f64,
    /// Argument of perigee including drag terms
    pub omega: f64,
    /// Argument of perigee without drag terms, used for the phase
    pub omgadf: f64,
    pub xl: f64,
    pub xnode: f64,
    pub xinc: f64,
}

struct KeplerSolution {
    sinepw: f64,
    cosepw: f64,
    ecose: f64,
    esine: f64,
}

/// Solves Kepler's equation for `capu` with the eccentricity vector
/// (`axn`, `ayn`). At most eleven Newton steps are taken; the last iterate
/// is used if the tolerance is not met.
fn solve(capu: f64, axn: f64, ayn: f64) -> KeplerSolution {
    let mut temp2 = capu;
    let mut sol = KeplerSolution {
        sinepw: 0.0,
        cosepw: 0.0,
        ecose: 0.0,
        esine: 0.0,
    };

    for iteration in 0..=10 {
        let sinepw = temp2.sin();
        let cosepw = temp2.cos();
        let temp3 = axn * sinepw;
        let temp4 = ayn * cosepw;
        let temp5 = axn * cosepw;
        let temp6 = ayn * sinepw;
        sol = KeplerSolution {
            sinepw,
            cosepw,
            ecose: temp5 + temp6,
            esine: temp3 - temp4,
        };

        let epw = (capu - temp4 + temp3 - temp2) / (1.0 - temp5 - temp6) + temp2;
        if (epw - temp2).abs() <= E6A {
            break;
        }
        if iteration == 10 {
            log::trace!("Kepler iteration did not converge, capu={capu}");
        }
        temp2 = epw;
    }

    sol
}

pub(crate) fn osculate(k: &PeriodicCoefficients, s: &SecularElements) -> OrbitState {
    let a = s.a;
    let e = s.e;
    let beta = (1.0 - e * e).sqrt();
    let xn = XKE / a.powf(1.5);

    // Long period periodics
    let axn = e * s.omega.cos();
    let temp = 1.0 / (a * beta * beta);
    let xll = temp * k.xlcof * axn;
    let aynl = temp * k.aycof;
    let xlt = s.xl + xll;
    let ayn = e * s.omega.sin() + aynl;

    let capu = fmod2p(xlt - s.xnode);
    let KeplerSolution {
        sinepw,
        cosepw,
        ecose,
        esine,
    } = solve(capu, axn, ayn);

    // Short period preliminary quantities
    let elsq = axn * axn + ayn * ayn;
    let temp = 1.0 - elsq;
    let pl = a * temp;
    let r = a * (1.0 - ecose);
    let temp1 = 1.0 / r;
    let rdot = XKE * a.sqrt() * esine * temp1;
    let rfdot = XKE * pl.sqrt() * temp1;
    let temp2 = a * temp1;
    let betal = temp.sqrt();
    let temp3 = 1.0 / (1.0 + betal);
    let cosu = temp2 * (cosepw - axn + ayn * esine * temp3);
    let sinu = temp2 * (sinepw - ayn - axn * esine * temp3);
    let u = ac_tan(sinu, cosu);
    let sin2u = 2.0 * sinu * cosu;
    let cos2u = 2.0 * cosu * cosu - 1.0;
    let temp = 1.0 / pl;
    let temp1 = CK2 * temp;
    let temp2 = temp1 * temp;

    // Update for short periodics
    let rk = r * (1.0 - 1.5 * temp2 * betal * k.x3thm1) + 0.5 * temp1 * k.x1mth2 * cos2u;
    let uk = u - 0.25 * temp2 * k.x7thm1 * sin2u;
    let xnodek = s.xnode + 1.5 * temp2 * k.cosio * sin2u;
    let xinck = s.xinc + 1.5 * temp2 * k.cosio * k.sinio * cos2u;
    let rdotk = rdot - xn * temp1 * k.x1mth2 * sin2u;
    let rfdotk = rfdot + xn * temp1 * (k.x1mth2 * cos2u + 1.5 * k.x3thm1);

    // Orientation vectors
    let (sinuk, cosuk) = uk.sin_cos();
    let (sinik, cosik) = xinck.sin_cos();
    let (sinnok, cosnok) = xnodek.sin_cos();
    let xmx = -sinnok * cosik;
    let xmy = cosnok * cosik;
    let ux = xmx * sinuk + cosnok * cosuk;
    let uy = xmy * sinuk + sinnok * cosuk;
    let uz = sinik * sinuk;
    let vx = xmx * cosuk - cosnok * sinuk;
    let vy = xmy * cosuk - sinnok * sinuk;
    let vz = sinik * cosuk;

    let pos = Vector {
        x: rk * ux,
        y: rk * uy,
        z: rk * uz,
        w: 0.0,
    };
    let vel = Vector {
        x: rdotk * ux + rfdotk * vx,
        y: rdotk * uy + rfdotk * vy,
        z: rdotk * uz + rfdotk * vz,
        w: 0.0,
    };

    let mut phase = xlt - s.xnode - s.omgadf + TWOPI;
    if phase < 0.0 {
        phase += TWOPI;
    }

    OrbitState {
        pos,
        vel,
        phase: fmod2p(phase),
        omega: s.omega,
        inclination: xinck,
        raan: xnodek,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_orbit_solves_immediately() {
        let sol = solve(1.0, 0.0, 0.0);
        assert!((sol.sinepw - 1.0_f64.sin()).abs() < 1e-12);
        assert_eq!(sol.ecose, 0.0);
    }

    #[test]
    fn eccentric_anomaly_satisfies_kepler() {
        // With the node and perigee at zero, capu is the mean anomaly.
        let (e, m) = (0.3, 2.0);
        let sol = solve(m, e, 0.0);
        let ea = sol.sinepw.atan2(sol.cosepw);
        assert!((ea - e * ea.sin() - m).abs() < 1e-5);
    }
}
