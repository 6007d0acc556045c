use serde::Serialize;

use super::consts::{PI, PIO2, TWOPI, X3PIO2, XKMPER, XMNPDA, SECDAY};

/// Three-vector carrying its own magnitude.
///
/// `w` is only meaningful after [`Vector::magnitude`] (or an operation that
/// recomputes it) has run; the propagators leave it at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 0.0,
    };

    /// Builds a vector and computes its magnitude.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        let mut v = Vector { x, y, z, w: 0.0 };
        v.magnitude();
        v
    }

    pub fn magnitude(&mut self) {
        self.w = (self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
    }

    pub fn add(&self, other: &Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(&self, other: &Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Multiplies by `k`, scaling the stored magnitude without recomputing it.
    pub fn scalar_multiply(&self, k: f64) -> Vector {
        Vector {
            x: k * self.x,
            y: k * self.y,
            z: k * self.z,
            w: k.abs() * self.w,
        }
    }

    /// Multiplies in place and recomputes the magnitude.
    pub fn scale(&mut self, k: f64) {
        self.x *= k;
        self.y *= k;
        self.z *= k;
        self.magnitude();
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector) -> Vector {
        Vector::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Angle between two vectors, radians.
    pub fn angle(&self, other: &Vector) -> f64 {
        let mut a = *self;
        let mut b = *other;
        a.magnitude();
        b.magnitude();
        arc_cos(a.dot(&b) / (a.w * b.w))
    }

    /// Divides the components by the stored magnitude.
    pub fn normalize(&mut self) {
        self.x /= self.w;
        self.y /= self.w;
        self.z /= self.w;
    }
}

pub fn sign(arg: f64) -> f64 {
    if arg > 0.0 {
        1.0
    } else if arg < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub fn radians(deg: f64) -> f64 {
    deg * super::consts::DE2RA
}

pub fn degrees(rad: f64) -> f64 {
    rad / super::consts::DE2RA
}

/// Arcsine saturating to ±π/2 outside [-1, 1].
pub fn arc_sin(arg: f64) -> f64 {
    if arg.abs() >= 1.0 {
        sign(arg) * PIO2
    } else {
        (arg / (1.0 - arg * arg).sqrt()).atan()
    }
}

pub fn arc_cos(arg: f64) -> f64 {
    PIO2 - arc_sin(arg)
}

/// Four-quadrant arctangent in [0, 2π).
///
/// With both arguments zero the result is 3π/2.
pub fn ac_tan(sinx: f64, cosx: f64) -> f64 {
    if cosx == 0.0 {
        if sinx > 0.0 {
            PIO2
        } else {
            X3PIO2
        }
    } else if cosx > 0.0 {
        if sinx > 0.0 {
            (sinx / cosx).atan()
        } else {
            TWOPI + (sinx / cosx).atan()
        }
    } else {
        PI + (sinx / cosx).atan()
    }
}

/// Reduces `x` modulo 2π into [0, 2π).
pub fn fmod2p(x: f64) -> f64 {
    modulus(x, TWOPI)
}

/// `arg1` mod `arg2`, with a non-negative result for positive `arg2`.
pub fn modulus(arg1: f64, arg2: f64) -> f64 {
    let i = (arg1 / arg2).trunc();
    let mut ret = arg1 - i * arg2;
    if ret < 0.0 {
        ret += arg2;
    }
    ret
}

/// Fractional part, always in [0, 1).
pub fn frac(arg: f64) -> f64 {
    arg - arg.floor()
}

/// Scales a propagator state from earth radii (and radii per minute) to km
/// and km/s.
pub fn convert_sat_state(pos: &mut Vector, vel: &mut Vector) {
    pos.scale(XKMPER);
    vel.scale(XKMPER * XMNPDA / SECDAY);
}
