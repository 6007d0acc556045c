use pass_o_mat::predict::{
    find_aos, find_los, get_current_pass, get_pass, get_passes, GroundStation, PassOptions,
    PassReport, Satellite,
};
use pass_o_mat::sgpsdp::tle::parse_tle;
use pass_o_mat::sgpsdp::ChecksumPolicy;

const ISS_1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
const ISS_2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

const GEO_1: &str = "1 99998U          80230.29629788  .00000000  00000-0  00000-0 0    12";
const GEO_2: &str = "2 99998   0.0500 100.0000 0002000  90.0000 180.0000  1.00270000    13";

fn satellite(name: &str, line1: &str, line2: &str) -> Satellite {
    let tle = parse_tle(Some(name), line1, line2, ChecksumPolicy::Strict).unwrap();
    Satellite::new(tle).unwrap()
}

fn copenhagen() -> GroundStation {
    GroundStation::new("CPH", 55.6867, 12.5701, 10.0)
}

#[test]
fn passes_are_well_formed() {
    let sat = satellite("ISS (ZARYA)", ISS_1, ISS_2);
    let qth = copenhagen();
    let opts = PassOptions::default();
    let start = sat.elements().jul_epoch;

    let passes = get_passes(&sat, &qth, &opts, start, 2.0, 0);
    assert!(!passes.is_empty());

    let mut probe = sat.clone();
    for pass in &passes {
        assert!(pass.aos < pass.tca && pass.tca < pass.los, "{pass:?}");
        assert!(pass.max_el >= opts.min_el);
        assert_eq!(pass.satellite, "ISS (ZARYA)");
        assert_eq!(pass.norad_id, 25544);
        assert_eq!(pass.qth, qth);

        assert!(probe.calc(&qth, pass.aos).el.abs() < 0.005);
        assert!(probe.calc(&qth, pass.los).el.abs() < 0.005);

        let mut last = f64::NEG_INFINITY;
        for detail in &pass.details {
            assert!(detail.time >= pass.aos && detail.time <= pass.los);
            assert!(detail.time > last);
            last = detail.time;
        }

        let peak = pass.details.iter().find(|d| d.time == pass.tca).unwrap();
        assert_eq!(peak.el, pass.max_el);
        assert!(pass.details.iter().all(|d| d.el <= pass.max_el));

        let vis = pass.vis.to_string();
        assert_eq!(vis.len(), 3);
        assert!(vis != "---");
    }
}

#[test]
fn consecutive_passes_move_forward() {
    let sat = satellite("ISS (ZARYA)", ISS_1, ISS_2);
    let qth = copenhagen();
    let opts = PassOptions {
        min_el: 0.0,
        ..PassOptions::default()
    };
    let start = sat.elements().jul_epoch + 0.25;
    let maxdt = 1.5;

    let passes = get_passes(&sat, &qth, &opts, start, maxdt, 0);
    assert!(passes.len() >= 2);
    for pair in passes.windows(2) {
        assert!(pair[0].aos < pair[1].aos);
        assert!(pair[0].los < pair[1].aos);
    }
    for pass in &passes {
        assert!(pass.los >= start);
        assert!(pass.aos <= start + maxdt);
    }

    let limited = get_passes(&sat, &qth, &opts, start, maxdt, 2);
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[..], passes[..2]);

    let single = get_passes(&sat, &qth, &opts, start, maxdt, 1);
    assert_eq!(single, vec![get_pass(&sat, &qth, &opts, start, maxdt).unwrap()]);
}

#[test]
fn current_pass_contains_the_query_time() {
    let sat = satellite("ISS (ZARYA)", ISS_1, ISS_2);
    let qth = copenhagen();
    let opts = PassOptions::default();
    let start = sat.elements().jul_epoch;

    let next = get_pass(&sat, &qth, &opts, start, 2.0).unwrap();
    let mid = next.tca;
    let los = find_los(&sat, &qth, mid, 1.0);
    assert!((los - next.los).abs() < 1e-3);

    let pass = get_current_pass(&sat, &qth, &opts, mid).unwrap();
    assert!(pass.aos <= mid && mid <= pass.los, "{} {} {}", pass.aos, mid, pass.los);
    assert!((pass.los - los).abs() < 1e-3);

    // A pass in progress at the start of a search is reported whole.
    let ongoing = get_pass(&sat, &qth, &PassOptions { min_el: 0.0, ..opts }, mid, 1.0).unwrap();
    assert!(ongoing.aos < mid && ongoing.los > mid);
}

#[test]
fn geostationary_satellite_never_rises() {
    let sat = satellite("GEO", GEO_1, GEO_2);
    let qth = copenhagen();
    let start = sat.elements().jul_epoch;

    assert!(sat.is_geostationary());
    assert!(!sat.has_aos(&qth, start));
    assert_eq!(find_aos(&sat, &qth, start, 0.0), 0.0);
    assert_eq!(find_los(&sat, &qth, start, 0.0), 0.0);
    assert!(get_pass(&sat, &qth, &PassOptions::default(), start, 0.0).is_none());
    assert!(get_passes(&sat, &qth, &PassOptions::default(), start, 1.0, 5).is_empty());
}

#[test]
fn report_matches_pass() {
    let sat = satellite("ISS (ZARYA)", ISS_1, ISS_2);
    let qth = copenhagen();
    let start = sat.elements().jul_epoch;
    let pass = get_pass(&sat, &qth, &PassOptions::default(), start, 2.0).unwrap();

    let report = PassReport::from(&pass);
    assert_eq!(report.norad_id, 25544);
    assert!(report.aos < report.tca && report.tca < report.los);
    assert!(report.duration_seconds > 0 && report.duration_seconds < 20 * 60);
    assert_eq!(report.visibility, pass.vis.to_string());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["satellite"], "ISS (ZARYA)");
}
