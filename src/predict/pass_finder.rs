//! AOS/LOS search and pass construction.
//!
//! All times are Julian dates. A returned time of `0.0` means no such event
//! exists within the search window. Every search works on a clone of the
//! caller's satellite, so the caller's propagator state and last
//! observation are never touched.

use std::time::Duration;

use crate::predict::satellite::Satellite;
use crate::predict::types::{Pass, PassDetail, VisibilitySummary};
use crate::predict::visibility::sat_visibility;
use crate::predict::GroundStation;
use crate::sgpsdp::consts::DE2RA;
use crate::sgpsdp::time::julian_now;

/// Gap between a LOS and the start of the next search, days (20 minutes).
const NEXT_PASS_GAP: f64 = 0.014;
/// Step past an AOS before hunting for its LOS (1.5 minutes).
const LOS_AFTER_AOS_GAP: f64 = 0.001;
const PREV_AOS_STEP: f64 = 0.0005;
const CURRENT_PASS_STEP: f64 = 0.007;
/// Elevation tolerance of the fine search, degrees
const HORIZON_TOLERANCE: f64 = 0.005;
const ONE_SECOND: f64 = 1.0 / 86400.0;
const DEFAULT_PASS_COUNT: usize = 100;

/// Knobs for pass construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOptions {
    /// Minimum peak elevation for a pass to count, degrees
    pub min_el: f64,
    /// Detail samples per pass
    pub num_entries: u32,
    /// Lower bound on the time between detail samples
    pub resolution: Duration,
    /// Sun elevation below which the station is dark, degrees
    pub twilight_threshold: f64,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            min_el: 5.0,
            num_entries: 20,
            resolution: Duration::from_secs(10),
            twilight_threshold: -6.0,
        }
    }
}

fn within(t: f64, start: f64, maxdt: f64) -> bool {
    maxdt <= 0.0 || t <= start + maxdt
}

/// Next time the satellite rises above the horizon, searching forward from
/// `start`. With `maxdt > 0` the search gives up after `start + maxdt`.
///
/// If the satellite is up at `start` the search begins after the current
/// pass has ended.
pub fn find_aos(sat: &Satellite, qth: &GroundStation, start: f64, maxdt: f64) -> f64 {
    let mut sat = sat.clone();
    aos_search(&mut sat, qth, start, maxdt)
}

/// Next time the satellite sets below the horizon, searching forward from
/// `start`. With `maxdt > 0` the search gives up after `start + maxdt`.
pub fn find_los(sat: &Satellite, qth: &GroundStation, start: f64, maxdt: f64) -> f64 {
    let mut sat = sat.clone();
    los_search(&mut sat, qth, start, maxdt)
}

/// Start of the pass in progress at `start`, found by stepping backwards.
///
/// Returns `start` unchanged when the satellite is below the horizon.
pub fn find_prev_aos(sat: &Satellite, qth: &GroundStation, start: f64) -> f64 {
    let mut sat = sat.clone();
    prev_aos_search(&mut sat, qth, start)
}

fn aos_search(sat: &mut Satellite, qth: &GroundStation, start: f64, maxdt: f64) -> f64 {
    let mut t = start;
    let mut obs = sat.calc(qth, start);

    if !sat.has_aos(qth, start) {
        return 0.0;
    }

    if obs.el > 0.0 {
        t = los_search(sat, qth, start, maxdt) + NEXT_PASS_GAP;
    }
    if t < 0.1 {
        return 0.0;
    }

    obs = sat.calc(qth, t);

    while obs.el < -1.0 && within(t, start, maxdt) {
        t -= 0.00035 * (obs.el * ((obs.alt / 8400.0) + 0.46) - 2.0);
        obs = sat.calc(qth, t);
    }

    while within(t, start, maxdt) {
        if obs.el.abs() < HORIZON_TOLERANCE {
            return t;
        }
        t -= obs.el * obs.alt.sqrt() / 530000.0;
        obs = sat.calc(qth, t);
    }

    0.0
}

fn los_search(sat: &mut Satellite, qth: &GroundStation, start: f64, maxdt: f64) -> f64 {
    let mut t = start;
    let mut obs = sat.calc(qth, start);

    if !sat.has_aos(qth, start) {
        return 0.0;
    }

    if obs.el < 0.0 {
        t = aos_search(sat, qth, start, maxdt) + LOS_AFTER_AOS_GAP;
    }
    if t < 0.01 {
        return 0.0;
    }

    obs = sat.calc(qth, t);

    while obs.el >= 1.0 && within(t, start, maxdt) {
        t += ((obs.el - 1.0) * DE2RA).cos() * obs.alt.sqrt() / 25000.0;
        obs = sat.calc(qth, t);
    }

    while within(t, start, maxdt) {
        t += obs.el * obs.alt.sqrt() / 502500.0;
        obs = sat.calc(qth, t);

        if obs.el.abs() < HORIZON_TOLERANCE {
            // A setting crossing has the elevation falling.
            let el_here = obs.el;
            obs = sat.calc(qth, t - ONE_SECOND);
            if obs.el > el_here {
                return t;
            }
        }
    }

    0.0
}

fn prev_aos_search(sat: &mut Satellite, qth: &GroundStation, start: f64) -> f64 {
    let mut aostime = start;
    let mut obs = sat.calc(qth, start);

    if !sat.has_aos(qth, start) {
        return 0.0;
    }

    while obs.el >= 0.0 {
        aostime -= PREV_AOS_STEP;
        obs = sat.calc(qth, aostime);
    }

    aostime
}

/// Next pass starting within `[start, start + maxdt]` whose peak elevation
/// reaches `opts.min_el` (0 is treated as 1 degree). A pass already in
/// progress at `start` is returned whole.
///
/// `maxdt <= 0` removes the time limit.
pub fn get_pass(
    sat: &Satellite,
    qth: &GroundStation,
    opts: &PassOptions,
    start: f64,
    maxdt: f64,
) -> Option<Pass> {
    let min_el = if opts.min_el == 0.0 { 1.0 } else { opts.min_el };
    pass_engine(sat, qth, opts, start, maxdt, min_el)
}

/// Like [`get_pass`] without the peak elevation requirement.
pub fn get_pass_no_min_el(
    sat: &Satellite,
    qth: &GroundStation,
    opts: &PassOptions,
    start: f64,
    maxdt: f64,
) -> Option<Pass> {
    pass_engine(sat, qth, opts, start, maxdt, 0.0)
}

fn pass_engine(
    sat: &Satellite,
    qth: &GroundStation,
    opts: &PassOptions,
    start: f64,
    maxdt: f64,
    min_el: f64,
) -> Option<Pass> {
    let mut sat = sat.clone();
    let tres = opts.resolution.as_secs_f64() / 86400.0;
    let mut t0 = start;

    loop {
        // The AOS search window shrinks as discarded passes push t0 forward.
        let aos_window = if maxdt > 0.0 { start + maxdt - t0 } else { 0.0 };
        if maxdt > 0.0 && aos_window <= 0.0 {
            return None;
        }

        let los = los_search(&mut sat, qth, t0, maxdt);
        let mut aos = aos_search(&mut sat, qth, t0, aos_window);

        if aos > los {
            // The LOS belongs to a pass that is already in progress.
            aos = prev_aos_search(&mut sat, qth, t0);
        }

        if aos == 0.0 || los == 0.0 || (maxdt > 0.0 && aos > start + maxdt) {
            return None;
        }

        let pass = sample_pass(&mut sat, qth, opts, aos, los, tres);
        if pass.max_el >= min_el {
            return Some(pass);
        }

        log::trace!(
            "{}: discarding pass at {:.5} with max elevation {:.2}",
            pass.satellite,
            pass.aos,
            pass.max_el
        );
        t0 = los + NEXT_PASS_GAP;
    }
}

fn sample_pass(
    sat: &mut Satellite,
    qth: &GroundStation,
    opts: &PassOptions,
    aos: f64,
    los: f64,
    tres: f64,
) -> Pass {
    let step = ((los - aos) / f64::from(opts.num_entries.max(1))).max(tres);

    let mut pass = Pass {
        satellite: sat.name().to_string(),
        norad_id: sat.catalog_number(),
        aos,
        tca: 0.0,
        los,
        max_el: 0.0,
        aos_az: 0.0,
        los_az: 0.0,
        maxel_az: 0.0,
        orbit: 0,
        vis: VisibilitySummary::default(),
        details: Vec::new(),
        qth: qth.clone(),
    };

    let mut t = aos;
    while t <= los {
        let obs = sat.calc(qth, t);
        if t == aos {
            pass.aos_az = obs.az;
            pass.orbit = obs.orbit;
        }

        let vis = sat_visibility(sat, qth, t, opts.twilight_threshold);
        pass.vis.record(vis);
        pass.details.push(PassDetail {
            time: t,
            pos: sat.pos,
            vel: sat.vel,
            velo: obs.velo,
            az: obs.az,
            el: obs.el,
            range: obs.range,
            range_rate: obs.range_rate,
            lat: obs.ssplat,
            lon: obs.ssplon,
            alt: obs.alt,
            ma: obs.ma,
            phase: obs.phase,
            footprint: obs.footprint,
            vis,
            orbit: obs.orbit,
        });

        if obs.el > pass.max_el {
            pass.max_el = obs.el;
            pass.tca = t;
            pass.maxel_az = obs.az;
        }

        t += step;
    }

    pass.los_az = sat.calc(qth, los).az;
    pass
}

/// Up to `num` consecutive passes from `start` (`num == 0` means 100).
///
/// Stops early when no further pass starts before `start + maxdt`.
pub fn get_passes(
    sat: &Satellite,
    qth: &GroundStation,
    opts: &PassOptions,
    start: f64,
    maxdt: f64,
    num: usize,
) -> Vec<Pass> {
    let num = if num == 0 { DEFAULT_PASS_COUNT } else { num };
    let mut passes = Vec::new();
    let mut t = start;

    while passes.len() < num {
        let remaining = if maxdt > 0.0 { start + maxdt - t } else { 0.0 };
        let Some(pass) = get_pass(sat, qth, opts, t, remaining) else {
            break;
        };
        t = pass.los + NEXT_PASS_GAP;
        passes.push(pass);

        if maxdt > 0.0 && t >= start + maxdt {
            break;
        }
    }

    log::info!(
        "Found {} passes for {} in time window [{:.5}; {:.5}]",
        passes.len(),
        sat.name(),
        start,
        start + maxdt
    );
    passes
}

/// The pass in progress at `start`, or the next one if the satellite is
/// below the horizon. `start <= 0` means now. No elevation gate applies.
pub fn get_current_pass(
    sat: &Satellite,
    qth: &GroundStation,
    opts: &PassOptions,
    start: f64,
) -> Option<Pass> {
    let mut sat = sat.clone();
    let t0 = if start > 0.0 { start } else { julian_now() };
    let mut t = t0;
    let mut obs = sat.calc(qth, t);
    let el0 = obs.el;

    if !sat.has_aos(qth, t0) {
        return None;
    }

    while obs.el > 0.0 {
        obs = sat.calc(qth, t);
        t -= CURRENT_PASS_STEP;
    }

    let pass = get_pass_no_min_el(&sat, qth, opts, t, 0.0)?;
    if el0 > 0.0 && (pass.aos > t0 || pass.los < t0) {
        log::error!(
            "{}: current pass [{:.5}; {:.5}] does not contain {:.5}",
            sat.name(),
            pass.aos,
            pass.los,
            t0
        );
    }
    Some(pass)
}

/// Next pass from now.
pub fn get_next_pass(sat: &Satellite, qth: &GroundStation, opts: &PassOptions, maxdt: f64) -> Option<Pass> {
    get_pass(sat, qth, opts, julian_now(), maxdt)
}

/// Up to `num` passes from now.
pub fn get_next_passes(
    sat: &Satellite,
    qth: &GroundStation,
    opts: &PassOptions,
    maxdt: f64,
    num: usize,
) -> Vec<Pass> {
    get_passes(sat, qth, opts, julian_now(), maxdt, num)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgpsdp::tle::parse_tle;
    use crate::sgpsdp::ChecksumPolicy;

    const ISS_1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn iss() -> Satellite {
        let tle = parse_tle(Some("ISS (ZARYA)"), ISS_1, ISS_2, ChecksumPolicy::Strict).unwrap();
        Satellite::new(tle).unwrap()
    }

    fn cph() -> GroundStation {
        GroundStation::new("CPH", 55.6867, 12.5701, 10.0)
    }

    #[test]
    fn aos_and_los_are_horizon_crossings() {
        let sat = iss();
        let qth = cph();
        let start = sat.elements().jul_epoch;

        let aos = find_aos(&sat, &qth, start, 2.0);
        assert!(aos > start && aos < start + 2.0);
        let los = find_los(&sat, &qth, aos, 2.0);
        assert!(los > aos);
        assert!(los - aos < 0.02, "pass lasted {} days", los - aos);

        let mut probe = sat.clone();
        assert!(probe.calc(&qth, aos).el.abs() < HORIZON_TOLERANCE);
        assert!(probe.calc(&qth, los).el.abs() < HORIZON_TOLERANCE);
        assert!(probe.calc(&qth, (aos + los) / 2.0).el > 0.0);
    }

    #[test]
    fn search_leaves_caller_untouched() {
        let mut sat = iss();
        let qth = cph();
        let start = sat.elements().jul_epoch;
        let before = sat.calc(&qth, start);
        find_aos(&sat, &qth, start, 1.0);
        get_pass(&sat, &qth, &PassOptions::default(), start, 1.0);
        assert_eq!(sat.obs, before);
    }

    #[test]
    fn prev_aos_steps_back_below_horizon() {
        let sat = iss();
        let qth = cph();
        let start = sat.elements().jul_epoch;
        let aos = find_aos(&sat, &qth, start, 2.0);
        let los = find_los(&sat, &qth, aos, 2.0);
        let mid = (aos + los) / 2.0;

        let prev = find_prev_aos(&sat, &qth, mid);
        assert!((aos - prev).abs() <= PREV_AOS_STEP + 1e-5);
        assert_eq!(find_prev_aos(&sat, &qth, aos - 0.01), aos - 0.01);
    }

    #[test]
    fn unreachable_station_has_no_events() {
        let sat = iss();
        let pole = GroundStation::new("Pole", 89.0, 0.0, 0.0);
        let start = sat.elements().jul_epoch;
        assert_eq!(find_aos(&sat, &pole, start, 1.0), 0.0);
        assert_eq!(find_los(&sat, &pole, start, 1.0), 0.0);
        assert_eq!(find_prev_aos(&sat, &pole, start), 0.0);
        assert!(get_pass(&sat, &pole, &PassOptions::default(), start, 1.0).is_none());
        assert!(get_current_pass(&sat, &pole, &PassOptions::default(), start).is_none());
    }

    #[test]
    fn pass_samples_are_consistent() {
        let sat = iss();
        let qth = cph();
        let opts = PassOptions {
            min_el: 10.0,
            ..PassOptions::default()
        };
        let start = sat.elements().jul_epoch;
        let pass = get_pass(&sat, &qth, &opts, start, 2.0).unwrap();

        assert!(pass.aos < pass.tca && pass.tca < pass.los);
        assert!(pass.max_el >= 10.0);
        assert_eq!(pass.details[0].time, pass.aos);
        assert_eq!(pass.details[0].az, pass.aos_az);
        assert!(pass.details.len() >= 2 && pass.details.len() <= opts.num_entries as usize + 1);
        for pair in pass.details.windows(2) {
            assert!(pair[0].time < pair[1].time);
        }
        let peak = pass.details.iter().find(|d| d.time == pass.tca).unwrap();
        assert_eq!(peak.el, pass.max_el);
        assert_eq!(peak.az, pass.maxel_az);
    }

    #[test]
    fn zero_min_el_means_one_degree() {
        let sat = iss();
        let qth = cph();
        let opts = PassOptions {
            min_el: 0.0,
            ..PassOptions::default()
        };
        let start = sat.elements().jul_epoch;
        for pass in get_passes(&sat, &qth, &opts, start, 1.0, 0) {
            assert!(pass.max_el >= 1.0);
        }
    }
}
