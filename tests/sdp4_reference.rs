use pass_o_mat::sgpsdp::math::convert_sat_state;
use pass_o_mat::sgpsdp::tle::parse_tle;
use pass_o_mat::sgpsdp::{select_ephemeris, ChecksumPolicy, Ephemeris, Sdp4, SelectedElements};

const LINE1: &str = "1 11801U          80230.29629788  .01431103  00000-0  14311-1 0    13";
const LINE2: &str = "2 11801  46.7916 230.4354 7318036  47.4722  10.4117  2.28537848    13";

// Spacetrack Report #3 deep-space test case, km and km/s.
const EXPECTED: [(f64, [f64; 3], [f64; 3]); 5] = [
    (
        0.0,
        [7473.37066650, 428.95261765, 5828.74786377],
        [5.1071513, 6.44468284, -0.18613096],
    ),
    (
        360.0,
        [-3305.22537232, 32410.86328125, -24697.17675781],
        [-1.30113538, -1.15131518, -0.28333528],
    ),
    (
        720.0,
        [14271.28759766, 24110.46411133, -4725.76837158],
        [-0.32050445, 2.67984074, -2.08405289],
    ),
    (
        1080.0,
        [-9990.05883789, 22717.35522461, -23616.890662501],
        [-1.01667246, -2.29026759, 0.72892364],
    ),
    (
        1440.0,
        [9787.86975097, 33753.34667969, -15030.81176758],
        [-1.09425966, 0.92358845, -1.52230928],
    ),
];

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= 1e-5 * expected.abs().max(1.0)
}

fn elements(line1: &str, line2: &str) -> SelectedElements {
    let mut tle = parse_tle(None, line1, line2, ChecksumPolicy::Strict).unwrap();
    select_ephemeris(&mut tle).unwrap()
}

#[test]
fn matches_spacetrack_report_vectors() {
    let el = elements(LINE1, LINE2);
    assert_eq!(el.ephemeris, Ephemeris::DeepSpace);

    let mut model = Sdp4::new(&el);
    assert!(!model.deep_space().is_resonant());
    for (tsince, pos, vel) in EXPECTED {
        let state = model.propagate(&el, tsince);
        let (mut p, mut v) = (state.pos, state.vel);
        convert_sat_state(&mut p, &mut v);

        for (axis, (a, e)) in [p.x, p.y, p.z].into_iter().zip(pos).enumerate() {
            assert!(close(a, e), "t={tsince} pos[{axis}] = {a}, expected {e}");
        }
        for (axis, (a, e)) in [v.x, v.y, v.z].into_iter().zip(vel).enumerate() {
            assert!(close(a, e), "t={tsince} vel[{axis}] = {a}, expected {e}");
        }
    }
}

#[test]
fn order_of_calls_does_not_matter() {
    let el = elements(LINE1, LINE2);
    let mut forward = Sdp4::new(&el);
    let mut fresh = Sdp4::new(&el);

    for t in [0.0, 360.0, 720.0, 1080.0] {
        forward.propagate(&el, t);
    }
    assert_eq!(forward.propagate(&el, 1440.0), fresh.propagate(&el, 1440.0));
}

type Vector3 = [f64; 3];

fn assert_state(model: &mut Sdp4, el: &SelectedElements, tsince: f64, pos: Vector3, vel: Vector3) {
    let state = model.propagate(el, tsince);
    let (mut p, mut v) = (state.pos, state.vel);
    convert_sat_state(&mut p, &mut v);

    let tight = |a: f64, e: f64| (a - e).abs() <= 1e-8 * e.abs().max(1.0);
    for (axis, (a, e)) in [p.x, p.y, p.z].into_iter().zip(pos).enumerate() {
        assert!(tight(a, e), "t={tsince} pos[{axis}] = {a}, expected {e}");
    }
    for (axis, (a, e)) in [v.x, v.y, v.z].into_iter().zip(vel).enumerate() {
        assert!(tight(a, e), "t={tsince} vel[{axis}] = {a}, expected {e}");
    }
}

// Molniya 2-14, 12 hour resonance.
const MOLNIYA_1: &str = "1 08195U 75081A   06176.33215444  .00000099  00000-0  11873-3 0   813";
const MOLNIYA_2: &str = "2 08195  64.1586 279.0717 6877146 264.7651  20.2257  2.00491383225656";

// XM-3, geosynchronous at near-zero inclination.
const GEO_1: &str = "1 28626U 05008A   06176.46683397 -.00000205  00000-0  10000-3 0  2190";
const GEO_2: &str = "2 28626   0.0019 286.9433 0000335  13.7918  55.6504  1.00270176  4891";

// Outbound sweep from epoch, km and km/s.
const MOLNIYA_FORWARD: [(f64, Vector3, Vector3); 6] = [
    (
        0.0,
        [2349.89616096, -14785.93667936, 0.02783111],
        [2.72148793722, -3.25681003455, 4.49841806560],
    ),
    (
        360.0,
        [19089.29777107, 3107.90066783, 39958.14539659],
        [-0.41030791643, 1.64033229678, -0.30687392003],
    ),
    (
        720.0,
        [2622.13177845, -15125.15106129, 474.51392530],
        [2.68828723199, -3.07842622571, 4.49498079325],
    ),
    (
        1440.0,
        [2890.80419613, -15446.43403214, 948.77026937],
        [2.65440772704, -2.90934554703, 4.48643855615],
    ),
    (
        2880.0,
        [3417.20373669, -16038.78650383, 1894.74284038],
        [2.58551652867, -2.59682071834, 4.45688376894],
    ),
    (
        4320.0,
        [3928.66563644, -16569.55786796, 2834.69409952],
        [2.51624271236, -2.31500504551, 4.41450196989],
    ),
];

const GEO_FORWARD: [(f64, Vector3, Vector3); 6] = [
    (
        0.0,
        [42080.72113993, -2646.85785539, -0.38327558],
        [0.19310479472, 3.06868818551, 0.00044160165],
    ),
    (
        360.0,
        [2467.44389262, 42093.61178205, 5.14247072],
        [-3.06934167218, 0.17997631352, 0.00003819289],
    ),
    (
        720.0,
        [-42103.20303433, 2291.06883793, 0.59628070],
        [-0.16697525030, -3.07010446429, -0.00030810232],
    ),
    (
        1440.0,
        [42119.96399146, -1925.78947224, 0.58155020],
        [0.14052225460, 3.07154149083, -0.00023337383],
    ),
    (
        2880.0,
        [42146.81831696, -1205.33874928, 0.50983349],
        [0.08798499339, 3.07349133904, -0.00024278270],
    ),
    (
        4320.0,
        [42161.33575738, -485.82534551, 0.38800471],
        [0.03551636060, 3.07454152266, -0.00027667129],
    ),
];

#[test]
fn half_day_resonance_matches_reference() {
    let el = elements(MOLNIYA_1, MOLNIYA_2);
    assert_eq!(el.ephemeris, Ephemeris::DeepSpace);

    let mut model = Sdp4::new(&el);
    assert!(model.deep_space().is_resonant());
    assert!(!model.deep_space().is_synchronous());

    for (tsince, pos, vel) in MOLNIYA_FORWARD {
        assert_state(&mut model, &el, tsince, pos, vel);
    }
    assert_eq!(model.deep_space().integrator().atime, 4320.0);

    // Earlier request after 4320: the integrator steps back from 4320.
    assert_state(
        &mut model,
        &el,
        1000.0,
        [20047.61612848, -4639.78025861, 39421.01290081],
        [0.00482534251, 1.62450523526, 0.53251502127],
    );
    assert_eq!(model.deep_space().integrator().atime, 720.0);

    // Negative time restarts at epoch.
    assert_state(
        &mut model,
        &el,
        -1500.0,
        [-3020.53412872, 10566.80897693, -2693.18584845],
        [-1.54898323130, -5.36819960918, -4.92347305508],
    );
    assert_eq!(model.deep_space().integrator().atime, -1440.0);
}

#[test]
fn stepping_back_differs_from_a_fresh_start() {
    let el = elements(MOLNIYA_1, MOLNIYA_2);
    let mut fresh = Sdp4::new(&el);
    assert_state(
        &mut fresh,
        &el,
        1000.0,
        [20047.61611797, -4639.78036852, 39421.01284398],
        [0.00482534879, 1.62450523422, 0.53251503375],
    );

    let mut travelled = Sdp4::new(&el);
    travelled.propagate(&el, 4320.0);
    let back = travelled.propagate(&el, 1000.0);
    let direct = Sdp4::new(&el).propagate(&el, 1000.0);
    assert_ne!(back.pos, direct.pos);

    // Crossing epoch discards the history.
    let restarted = travelled.propagate(&el, -1500.0);
    assert_eq!(restarted, Sdp4::new(&el).propagate(&el, -1500.0));
    let forward_again = travelled.propagate(&el, 4320.0);
    assert_eq!(forward_again, Sdp4::new(&el).propagate(&el, 4320.0));
}

#[test]
fn synchronous_resonance_matches_reference() {
    let el = elements(GEO_1, GEO_2);
    let mut model = Sdp4::new(&el);
    assert!(model.deep_space().is_resonant());
    assert!(model.deep_space().is_synchronous());

    for (tsince, pos, vel) in GEO_FORWARD {
        assert_state(&mut model, &el, tsince, pos, vel);
    }

    assert_state(
        &mut model,
        &el,
        1000.0,
        [-16423.11870404, -38833.92343594, -3.09548081],
        [2.83195881145, -1.19756371857, -0.00012910041],
    );
    assert_state(
        &mut model,
        &el,
        -1500.0,
        [39714.67210070, -14160.06471411, -1.65131885],
        [1.03268746355, 2.89617663926, 0.00069622070],
    );
}

#[test]
fn lunar_solar_periodics_are_held_for_thirty_minutes() {
    let el = elements(LINE1, LINE2);
    let mut model = Sdp4::new(&el);
    assert!(!model.deep_space().is_resonant());

    assert_state(
        &mut model,
        &el,
        1000.0,
        [-4321.07146552, 31296.38825201, -24823.18375528],
        [-1.28907592730, -1.30353010867, -0.16571256535],
    );
    // 29 minutes later the terms computed at t=1000 are still in use.
    assert_state(
        &mut model,
        &el,
        1029.0,
        [-6515.22820567, 28727.51351425, -24868.38733090],
        [-1.22752423778, -1.64420600655, 0.11660590219],
    );

    let mut fresh = Sdp4::new(&el);
    assert_state(
        &mut fresh,
        &el,
        1029.0,
        [-6515.21256424, 28727.53075525, -24868.39492478],
        [-1.22752300342, -1.64420455501, 0.11660462350],
    );

    // Thirty minutes or more away, the terms are recomputed.
    let mut model = Sdp4::new(&el);
    model.propagate(&el, 1000.0);
    assert_eq!(model.propagate(&el, 1030.0), Sdp4::new(&el).propagate(&el, 1030.0));
}
