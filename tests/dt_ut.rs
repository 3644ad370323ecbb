//! Tests for the discrete-time and untimed MoCs.
//!
//! These tests verify the correctness of:
//! - DT state machines keeping outputs aligned with input instants
//! - Untimed machines whose input rate depends on their state
//! - Sources, delays and sinks of both MoCs
//! - Control-driven zips and multi-port combinators

use std::sync::Arc;

use forsyde::moc::{dt, ut};
use forsyde::{AbstExt, RunOutcome, SimError, Simulation};
use parking_lot::Mutex;

fn p<T>(v: T) -> AbstExt<T> {
    AbstExt::Present(v)
}

// ============================================================================
// DT Tests
// ============================================================================

#[test]
fn test_dt_decimator_keeps_alignment() {
    let mut sim = Simulation::new();
    let (i, o) = (sim.signal("i"), sim.signal("o"));
    sim.add(dt::VSource::new("src", vec![(0, 1), (1, 2), (2, 3), (3, 4)], i.writer().unwrap()));
    sim.add(dt::Mealy::new(
        "down2",
        |_: &()| 2,
        |_: &(), _: &[AbstExt<i32>]| (),
        |_: &(), xs: &[AbstExt<i32>]| vec![xs[0]],
        (),
        i.reader().unwrap(),
        o.writer().unwrap(),
    ));
    sim.run().unwrap();
    assert_eq!(o.contents(), vec![AbstExt::Absent, p(1), AbstExt::Absent, p(3)]);
}

#[test]
fn test_dt_source_fanout_and_sink() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    let mut sim = Simulation::new();
    let (s, a, b) = (sim.signal("s"), sim.signal("a"), sim.signal("b"));
    sim.add(dt::Source::new(
        "pow2",
        |x: &AbstExt<u32>| x.map(|v| v * 2),
        p(1),
        4,
        s.writer().unwrap(),
    ));
    sim.add(dt::Fanout::new("fan", s.reader().unwrap(), a.writer().unwrap().and(&b).unwrap()));
    sim.add(dt::Sink::new("monitor", move |x: &AbstExt<u32>| log.lock().push(*x), a.reader().unwrap()));
    sim.run().unwrap();

    assert_eq!(*seen.lock(), vec![p(1), p(2), p(4), p(8)]);
    assert_eq!(b.len(), 4);
}

#[test]
fn test_dt_delayn_prepends_initial_values() {
    let mut sim = Simulation::new();
    let (i, o) = (sim.signal("i"), sim.signal("o"));
    sim.add(dt::Constant::new("k", p('a'), 2, i.writer().unwrap()));
    sim.add(dt::DelayN::new("z2", AbstExt::Absent, 2, i.reader().unwrap(), o.writer().unwrap()));
    sim.run().unwrap();
    assert_eq!(o.contents(), vec![AbstExt::Absent, AbstExt::Absent, p('a'), p('a')]);
}

#[test]
fn test_dt_mealy_with_zero_rate_ends_with_input() {
    let mut sim = Simulation::new();
    let (i, o) = (sim.signal("i"), sim.signal("o"));
    sim.add(dt::VSource::new("src", vec![(0, 1), (1, 2)], i.writer().unwrap()));
    // stops reading after two tokens
    sim.add(dt::Mealy::new(
        "two",
        |s: &usize| if *s < 2 { 1 } else { 0 },
        |s: &usize, xs: &[AbstExt<i32>]| s + xs.len(),
        |_: &usize, xs: &[AbstExt<i32>]| xs.to_vec(),
        0usize,
        i.reader().unwrap(),
        o.writer().unwrap(),
    ));
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(o.contents(), vec![p(1), p(2)]);
}

#[test]
fn test_dt_zip_rate_follows_control() {
    let mut sim = Simulation::new();
    let (a, b, c, z) = (sim.signal("a"), sim.signal("b"), sim.signal("c"), sim.signal("z"));
    sim.add(dt::VSource::new("a", vec![(0, 1), (1, 2), (2, 3)], a.writer().unwrap()));
    sim.add(dt::VSource::new("b", vec![(0, 'a'), (1, 'b'), (2, 'c')], b.writer().unwrap()));
    sim.add(dt::VSource::new("c", vec![(0, 2usize), (1, 9), (2, 0)], c.writer().unwrap()));
    sim.add(dt::Zip::new(
        "zip",
        |k: &usize| if *k == 0 { 1 } else { *k },
        a.reader().unwrap(),
        b.reader().unwrap(),
        c.reader().unwrap(),
        z.writer().unwrap(),
    ));
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(
        z.contents(),
        vec![
            p((vec![p(1)], vec![p('a')])),
            AbstExt::Absent,
            p((vec![p(2), p(3)], vec![p('b'), p('c')])),
        ]
    );
}

#[test]
fn test_dt_zip_rejects_absent_control() {
    let mut sim = Simulation::new();
    let (a, b, c) = (sim.signal("a"), sim.signal("b"), sim.signal("c"));
    let z = sim.signal::<AbstExt<dt::ZipBlock<i32, i32>>>("z");
    sim.add(dt::VSource::new("a", vec![(0, 1)], a.writer().unwrap()));
    sim.add(dt::VSource::new("b", vec![(0, 2)], b.writer().unwrap()));
    sim.add(dt::VSource::new("c", vec![(1, 1usize)], c.writer().unwrap()));
    sim.add(dt::Zip::new(
        "zip",
        |_: &usize| 1,
        a.reader().unwrap(),
        b.reader().unwrap(),
        c.reader().unwrap(),
        z.writer().unwrap(),
    ));
    let err = sim.run().unwrap_err();
    assert!(matches!(err, SimError::Process { ref process, .. } if process == "zip"));
}

#[test]
fn test_dt_zipn_pads_before_block() {
    let mut sim = Simulation::new();
    let (a, b, c, z) = (sim.signal("a"), sim.signal("b"), sim.signal("c"), sim.signal("z"));
    sim.add(dt::VSource::new("a", vec![(0, 1), (1, 2)], a.writer().unwrap()));
    sim.add(dt::VSource::new("b", vec![(1, 5)], b.writer().unwrap()));
    sim.add(dt::Constant::new("ctl", p(0usize), 2, c.writer().unwrap()));
    sim.add(dt::ZipN::new(
        "zip",
        |_: &usize| 2,
        vec![a.reader().unwrap(), b.reader().unwrap()],
        c.reader().unwrap(),
        z.writer().unwrap(),
    ));
    sim.run().unwrap();
    assert_eq!(
        z.contents(),
        vec![AbstExt::Absent, p(vec![vec![p(1), p(2)], vec![AbstExt::Absent, p(5)]])]
    );
}

#[test]
fn test_dt_unzipn_spreads_absent_vectors() {
    let mut sim = Simulation::new();
    let (i, x, y) = (sim.signal("i"), sim.signal("x"), sim.signal("y"));
    sim.add(dt::VSource::new(
        "src",
        vec![(0, vec![p(1), AbstExt::Absent]), (2, vec![p(3), p(4)])],
        i.writer().unwrap(),
    ));
    sim.add(dt::UnzipN::new("unzip", i.reader().unwrap(), vec![x.writer().unwrap(), y.writer().unwrap()]));
    sim.run().unwrap();
    assert_eq!(x.contents(), vec![p(1), AbstExt::Absent, p(3)]);
    assert_eq!(y.contents(), vec![AbstExt::Absent, AbstExt::Absent, p(4)]);
}

#[test]
fn test_dt_mealy_mn_pads_each_output() {
    let mut sim = Simulation::new();
    let (a, b) = (sim.signal("a"), sim.signal("b"));
    let (sum, echo) = (sim.signal("sum"), sim.signal("echo"));
    sim.add(dt::Constant::new("a", p(1), 4, a.writer().unwrap()));
    sim.add(dt::Constant::new("b", p(10), 4, b.writer().unwrap()));
    // one sum per window on the first output, the second input echoed on the other
    sim.add(dt::MealyMN::new(
        "mix",
        |_: &()| 2,
        |_: &(), _: &[Vec<AbstExt<i32>>]| (),
        |_: &(), xs: &[Vec<AbstExt<i32>>]| {
            let total = xs.iter().flatten().map(|x| x.from_abst_ext(0)).sum::<i32>();
            vec![vec![p(total)], xs[1].clone()]
        },
        (),
        vec![a.reader().unwrap(), b.reader().unwrap()],
        vec![sum.writer().unwrap(), echo.writer().unwrap()],
    ));
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(sum.contents(), vec![AbstExt::Absent, p(22), AbstExt::Absent, p(22)]);
    assert_eq!(echo.contents(), vec![AbstExt::Absent, p(10), p(10), p(10), p(10)]);
}

#[test]
fn test_dt_mealy_mn_rejects_missing_outputs() {
    let mut sim = Simulation::new();
    let (a, o1, o2) = (sim.signal("a"), sim.signal::<AbstExt<i32>>("o1"), sim.signal::<AbstExt<i32>>("o2"));
    sim.add(dt::Constant::new("a", p(1), 1, a.writer().unwrap()));
    sim.add(dt::MealyMN::new(
        "short",
        |_: &()| 1,
        |_: &(), _: &[Vec<AbstExt<i32>>]| (),
        |_: &(), _: &[Vec<AbstExt<i32>>]| Vec::new(),
        (),
        vec![a.reader().unwrap()],
        vec![o1.writer().unwrap(), o2.writer().unwrap()],
    ));
    let err = sim.run().unwrap_err();
    assert!(matches!(
        err,
        SimError::RateMismatch { ref process, expected: 2, actual: 0 } if process == "short"
    ));
}

// ============================================================================
// UT Tests
// ============================================================================

#[test]
fn test_ut_pairwise_sum_then_scan() {
    let mut sim = Simulation::new();
    let (n, pairs, acc) = (sim.signal("n"), sim.signal("pairs"), sim.signal("acc"));
    sim.add(ut::Source::new("nat", |x: &u64| x + 1, 1, 6, n.writer().unwrap()));
    sim.add(ut::Comb::new(
        "pair",
        2,
        |xs: &[u64]| vec![xs[0] + xs[1]],
        n.reader().unwrap(),
        pairs.writer().unwrap(),
    ));
    sim.add(ut::Scan::new(
        "total",
        |_: &u64| 1,
        |s: &u64, xs: &[u64]| s + xs[0],
        0,
        pairs.reader().unwrap(),
        acc.writer().unwrap(),
    ));
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(acc.contents(), vec![3, 10, 21]);
}

#[test]
fn test_ut_moore_run_length_decoder() {
    // (count, value) pairs; the state is the last decoded run
    let mut sim = Simulation::new();
    let (i, o) = (sim.signal("i"), sim.signal("o"));
    sim.add(ut::VSource::new("rle", vec![2, 7, 3, 9], i.writer().unwrap()));
    sim.add(ut::Moore::new(
        "decode",
        |_: &Vec<u32>| 2,
        |_: &Vec<u32>, xs: &[u32]| vec![xs[1]; xs[0] as usize],
        |s: &Vec<u32>| s.clone(),
        Vec::new(),
        i.reader().unwrap(),
        o.writer().unwrap(),
    ));
    sim.run().unwrap();
    assert_eq!(o.contents(), vec![7, 7, 9, 9, 9]);
}

#[test]
fn test_ut_delayn_and_sink() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    let mut sim = Simulation::new();
    let (i, d) = (sim.signal("i"), sim.signal("d"));
    sim.add(ut::Constant::new("k", "x", 2, i.writer().unwrap()));
    sim.add(ut::DelayN::new("z2", "init", 2, i.reader().unwrap(), d.writer().unwrap()));
    sim.add(ut::Sink::new("monitor", move |s: &&str| log.lock().push(*s), d.reader().unwrap()));
    sim.run().unwrap();
    assert_eq!(*seen.lock(), vec!["init", "init", "x", "x"]);
}

#[test]
fn test_ut_scan_with_zero_rate_ends_with_input() {
    let mut sim = Simulation::new().with_max_rounds(1000);
    let (i, o) = (sim.signal("i"), sim.signal("o"));
    sim.add(ut::VSource::new("src", vec![1, 2], i.writer().unwrap()));
    sim.add(ut::Scan::new(
        "sat",
        |s: &i32| if *s < 2 { 1 } else { 0 },
        |s: &i32, xs: &[i32]| s + xs.iter().sum::<i32>(),
        0,
        i.reader().unwrap(),
        o.writer().unwrap(),
    ));
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    // zero-token firings repeat the saturated state until the source closes
    let out = o.contents();
    assert_eq!(out[..2], [1, 3]);
    assert!(out[2..].iter().all(|s| *s == 3));
    assert!(out.len() < 10);
}

#[test]
fn test_ut_comb3_reads_per_input_rates() {
    let mut sim = Simulation::new();
    let (a, b, c, o) = (sim.signal("a"), sim.signal("b"), sim.signal("c"), sim.signal("o"));
    sim.add(ut::VSource::new("a", vec![1, 2, 3, 4], a.writer().unwrap()));
    sim.add(ut::VSource::new("b", vec![10, 20], b.writer().unwrap()));
    sim.add(ut::VSource::new("c", vec![100, 200], c.writer().unwrap()));
    sim.add(ut::Comb3::new(
        "sum",
        [2, 1, 1],
        |x: &[i32], y: &[i32], z: &[i32]| vec![x.iter().sum::<i32>() + y[0] + z[0]],
        (a.reader().unwrap(), b.reader().unwrap(), c.reader().unwrap()),
        o.writer().unwrap(),
    ));
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(o.contents(), vec![113, 227]);
}

#[test]
fn test_ut_comb4_ends_with_shortest_input() {
    let mut sim = Simulation::new();
    let (a, b, c, d) = (sim.signal("a"), sim.signal("b"), sim.signal("c"), sim.signal("d"));
    let o = sim.signal("o");
    sim.add(ut::VSource::new("a", vec![1u32, 2, 3], a.writer().unwrap()));
    sim.add(ut::VSource::new("b", vec!['x', 'y', 'z'], b.writer().unwrap()));
    sim.add(ut::VSource::new("c", vec![true, false], c.writer().unwrap()));
    sim.add(ut::VSource::new("d", vec![7u64, 8, 9], d.writer().unwrap()));
    sim.add(ut::Comb4::new(
        "fmt",
        [1, 1, 1, 1],
        |n: &[u32], ch: &[char], f: &[bool], k: &[u64]| vec![format!("{}{}{}{}", n[0], ch[0], f[0], k[0])],
        (a.reader().unwrap(), b.reader().unwrap(), c.reader().unwrap(), d.reader().unwrap()),
        o.writer().unwrap(),
    ));
    sim.run().unwrap();
    assert_eq!(o.contents(), vec!["1xtrue7".to_string(), "2yfalse8".to_string()]);
}

#[test]
fn test_ut_scand_emits_initial_state_first() {
    let mut sim = Simulation::new();
    let (i, o) = (sim.signal("i"), sim.signal("o"));
    sim.add(ut::VSource::new("src", vec![1, 2, 3], i.writer().unwrap()));
    sim.add(ut::ScanD::new(
        "total",
        |_: &i32| 1,
        |s: &i32, xs: &[i32]| s + xs[0],
        0,
        i.reader().unwrap(),
        o.writer().unwrap(),
    ));
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(o.contents(), vec![0, 1, 3, 6]);
}

#[test]
fn test_ut_zipu_rates_follow_control_tokens() {
    let mut sim = Simulation::new();
    let (a, b, c, z) = (sim.signal("a"), sim.signal("b"), sim.signal("c"), sim.signal("z"));
    sim.add(ut::VSource::new("a", vec![1, 2, 3], a.writer().unwrap()));
    sim.add(ut::VSource::new("b", vec!['x', 'y', 'z'], b.writer().unwrap()));
    sim.add(ut::VSource::new("ctl", vec![1u8, 2], c.writer().unwrap()));
    sim.add(ut::ZipU::new(
        "zip",
        (|c: &u8| *c as usize, |_: &u8| 1),
        (a.reader().unwrap(), b.reader().unwrap()),
        c.reader().unwrap(),
        z.writer().unwrap(),
    ));
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(z.contents(), vec![(vec![1], vec!['x']), (vec![2, 3], vec!['y'])]);
    // the last data token was never claimed by a control token
    assert_eq!(b.contents(), vec!['z']);
}
