//! SGP4/SDP4 orbit propagation and the geometry around it.

pub mod consts;
mod deep;
pub mod ephemeris;
mod error;
pub mod kepler;
pub mod math;
pub mod observer;
mod sdp4;
mod sgp4;
pub mod solar;
pub mod time;
pub mod tle;

pub use deep::{DeepSpace, ResonanceIntegrator};
pub use ephemeris::{select_ephemeris, Ephemeris, SelectedElements};
pub use error::TleError;
pub use kepler::OrbitState;
pub use math::Vector;
pub use observer::{Geodetic, ObsSet, RaDec};
pub use sdp4::Sdp4;
pub use sgp4::Sgp4;
pub use tle::{ChecksumPolicy, OperationalStatus, OrbitalElements};
