use super::consts::{AU, SECDAY, SOLAR_RADIUS, TWOPI, XKMPER};
use super::math::{arc_sin, modulus, radians, Vector};
use super::time::delta_et;

/// Approximate ECI position of the sun at `jd`, km.
pub fn solar_position(jd: f64) -> Vector {
    let mjd = jd - 2415020.0;
    let year = 1900.0 + mjd / 365.25;
    let t = (mjd + delta_et(year) / SECDAY) / 36525.0;

    let m = radians(modulus(
        358.47583 + modulus(35999.04975 * t, 360.0) - (0.000150 + 0.0000033 * t) * t * t,
        360.0,
    ));
    let l = radians(modulus(
        279.69668 + modulus(36000.76892 * t, 360.0) + 0.0003025 * t * t,
        360.0,
    ));
    let e = 0.01675104 - (0.0000418 + 0.000000126 * t) * t;
    let c = radians(
        (1.919460 - (0.004789 + 0.000014 * t) * t) * m.sin()
            + (0.020094 - 0.000100 * t) * (2.0 * m).sin()
            + 0.000293 * (3.0 * m).sin(),
    );
    let o = radians(modulus(259.18 - 1934.142 * t, 360.0));
    let lsa = modulus(l + c - radians(0.00569 - 0.00479 * o.sin()), TWOPI);
    let nu = modulus(m + c, TWOPI);
    let r = 1.0000002 * (1.0 - e * e) / (1.0 + e * nu.cos());
    let eps = radians(
        23.452294 - (0.0130125 + (0.00000164 - 0.000000503 * t) * t) * t + 0.00256 * o.cos(),
    );
    let r = AU * r;

    Vector {
        x: r * lsa.cos(),
        y: r * lsa.sin() * eps.cos(),
        z: r * lsa.sin() * eps.sin(),
        w: r,
    }
}

/// Whether a satellite at `pos` is in the earth's umbra with the sun at
/// `sol` (both ECI, km). The second value is the eclipse depth, radians;
/// it is positive inside the shadow.
pub fn sat_eclipsed(pos: &Vector, sol: &Vector) -> (bool, f64) {
    let mut pos = *pos;
    pos.magnitude();

    let sd_earth = arc_sin(XKMPER / pos.w);
    let rho = sol.sub(&pos);
    let sd_sun = arc_sin(SOLAR_RADIUS / rho.w);
    let earth = pos.scalar_multiply(-1.0);
    let delta = sol.angle(&earth);
    let depth = sd_earth - sd_sun - delta;

    if sd_earth < sd_sun {
        (false, depth)
    } else {
        (depth >= 0.0, depth)
    }
}
