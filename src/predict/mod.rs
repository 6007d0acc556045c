mod error;
mod ground_station;
pub mod pass_finder;
pub mod satellite;
mod tle_loader;
mod types;
pub mod visibility;

pub use error::PredictError;
pub use ground_station::GroundStation;
pub use pass_finder::{
    find_aos, find_los, find_prev_aos, get_current_pass, get_next_pass, get_next_passes, get_pass,
    get_pass_no_min_el, get_passes, PassOptions,
};
pub use satellite::{ModelState, Observation, OrbitType, Satellite};
pub use tle_loader::{parse_tle_text, TleEntry, TleLoader};
pub use types::{Pass, PassDetail, PassReport, SatelliteInfo, VisibilitySummary};
pub use visibility::{eclipse_depth, sat_visibility, Visibility};
