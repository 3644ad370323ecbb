//! Tests for the untimed token-driven MoCs: SY and SDF.
//!
//! These tests verify the correctness of:
//! - Absent-extended values
//! - The SDF rate contract (consume N, produce M, block below N)
//! - SDF regrouping across N ports
//! - SY lockstep composition with state machines and delays
//! - Models mixing SY and SDF through interfaces

use forsyde::moc::{mi, sdf, sy};
use forsyde::{AbstExt, OutputPort, RunOutcome, Signal, SimError, Simulation};
use proptest::prelude::*;

fn p<T>(v: T) -> AbstExt<T> {
    AbstExt::Present(v)
}

// ============================================================================
// Absent-Extended Values
// ============================================================================

#[test]
fn test_absent_default_and_conversions() {
    let a: AbstExt<u8> = AbstExt::default();
    assert!(a.is_absent());
    assert_eq!(AbstExt::<i32>::from(Some(3)), p(3));
    assert_eq!(AbstExt::<i32>::from(None::<i32>), AbstExt::Absent);
    assert_eq!(p(4).into_option(), Some(4));
}

proptest! {
    #[test]
    fn prop_present_round_trip(x in any::<i64>(), d in any::<i64>()) {
        prop_assert_eq!(AbstExt::present(x).from_abst_ext(d), x);
        prop_assert!(AbstExt::present(x).is_present());
    }

    #[test]
    fn prop_absent_yields_default(d in any::<i64>()) {
        let a: AbstExt<i64> = AbstExt::absent();
        prop_assert!(a.is_absent());
        prop_assert_eq!(a.from_abst_ext(d), d);
    }
}

// ============================================================================
// SDF Rate Contract
// ============================================================================

proptest! {
    #[test]
    fn prop_sdf_comb_rates(
        tokens in prop::collection::vec(-100i32..100, 0..48),
        i_toks in 1usize..6,
        o_toks in 1usize..4,
    ) {
        let mut sim = Simulation::new();
        let (i, o) = (sim.signal("i"), sim.signal("o"));
        sim.add(sdf::VSource::new("src", tokens.clone(), i.writer().unwrap()));
        sim.add(sdf::Comb::new(
            "sum",
            move |xs: &[i32]| vec![xs.iter().sum::<i32>(); o_toks],
            o_toks,
            i_toks,
            i.reader().unwrap(),
            o.writer().unwrap(),
        ));
        let report = sim.run().unwrap();
        prop_assert_eq!(report.outcome, RunOutcome::Finished);

        let firings = tokens.len() / i_toks;
        let expected: Vec<i32> = tokens
            .chunks_exact(i_toks)
            .flat_map(|c| vec![c.iter().sum::<i32>(); o_toks])
            .collect();
        prop_assert_eq!(o.contents(), expected);
        // a partial window is never consumed
        prop_assert_eq!(i.contents().len(), tokens.len() % i_toks);
        let stats = sim.stats();
        prop_assert_eq!(stats.process("sum").map(|s| s.firings), Some(firings as u64));
    }
}

#[test]
fn test_sdf_comb_blocks_until_rate_available() {
    let mut sim = Simulation::new();
    let i: Signal<i32> = sim.signal("i");
    let o = sim.signal("o");
    let mut feeder = i.writer().unwrap();
    sim.add(sdf::Comb::new(
        "pairs",
        |xs: &[i32]| vec![xs[0] * xs[1]],
        1,
        2,
        i.reader().unwrap(),
        o.writer().unwrap(),
    ));

    feeder.write(3);
    feeder.flush();
    let report = sim.run().unwrap();
    assert!(matches!(report.outcome, RunOutcome::Quiescent { ref blocked } if blocked == &["pairs".to_string()]));
    assert_eq!(i.contents(), vec![3]);

    feeder.write(4);
    feeder.flush();
    feeder.close();
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(o.contents(), vec![12]);
}

#[test]
fn test_sdf_rate_mismatch_aborts_run() {
    let mut sim = Simulation::new();
    let (i, o) = (sim.signal("i"), sim.signal::<i32>("o"));
    sim.add(sdf::VSource::new("src", vec![1, 2], i.writer().unwrap()));
    sim.add(sdf::Comb::new(
        "bad",
        |xs: &[i32]| xs.to_vec(),
        3,
        1,
        i.reader().unwrap(),
        o.writer().unwrap(),
    ));
    let err = sim.run().unwrap_err();
    assert!(matches!(
        err,
        SimError::RateMismatch { ref process, expected: 3, actual: 1 } if process == "bad"
    ));
}

#[test]
fn test_sdf_delay_breaks_feedback_cycle() {
    // running sum: acc = delay(acc + x)
    let mut sim = Simulation::new();
    let (x, acc, next, tap) = (
        sim.signal("x"),
        sim.signal("acc"),
        sim.signal("next"),
        sim.signal("tap"),
    );
    sim.add(sdf::VSource::new("x", vec![1, 2, 3, 4], x.writer().unwrap()));
    sim.add(sdf::Comb2::new(
        "add",
        |a: &[i32], b: &[i32]| vec![a[0] + b[0]],
        1,
        1,
        1,
        x.reader().unwrap(),
        acc.reader().unwrap(),
        next.writer().unwrap().and(&tap).unwrap(),
    ));
    sim.add(sdf::Delay::new("z", 0, next.reader().unwrap(), acc.writer().unwrap()));
    sim.run().unwrap();
    assert_eq!(tap.contents(), vec![1, 3, 6, 10]);
}

#[test]
fn test_sdf_zipn_then_unzipn_regroups_tokens() {
    let mut sim = Simulation::new();
    let (a, b, z) = (sim.signal("a"), sim.signal("b"), sim.signal("z"));
    let (x, y) = (sim.signal("x"), sim.signal("y"));
    sim.add(sdf::VSource::new("a", vec![1, 2, 3, 4], a.writer().unwrap()));
    sim.add(sdf::VSource::new("b", vec![10, 20], b.writer().unwrap()));
    sim.add(sdf::ZipN::new(
        "zip",
        vec![2, 1],
        vec![a.reader().unwrap(), b.reader().unwrap()],
        z.writer().unwrap(),
    ));
    sim.add(sdf::UnzipN::new(
        "unzip",
        vec![2, 1],
        z.reader().unwrap(),
        vec![x.writer().unwrap(), y.writer().unwrap()],
    ));

    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(x.contents(), vec![1, 2, 3, 4]);
    assert_eq!(y.contents(), vec![10, 20]);
    assert_eq!(sim.stats().process("zip").map(|s| s.firings), Some(2));
}

#[test]
fn test_sdf_unzipn_rejects_wrong_block_size() {
    let mut sim = Simulation::new();
    let (i, x, y) = (sim.signal("i"), sim.signal::<i32>("x"), sim.signal::<i32>("y"));
    sim.add(sdf::VSource::new("src", vec![vec![vec![1, 2], vec![3]]], i.writer().unwrap()));
    sim.add(sdf::UnzipN::new(
        "unzip",
        vec![1, 1],
        i.reader().unwrap(),
        vec![x.writer().unwrap(), y.writer().unwrap()],
    ));
    let err = sim.run().unwrap_err();
    assert!(matches!(
        err,
        SimError::RateMismatch { ref process, expected: 1, actual: 2 } if process == "unzip"
    ));
    assert!(x.is_empty());
}

// ============================================================================
// SY Composition
// ============================================================================

#[test]
fn test_sy_moore_counter_with_reset() {
    let mut sim = Simulation::new();
    let (i, o) = (sim.signal("i"), sim.signal("o"));
    sim.add(sy::VSource::with_absents(
        "reset",
        vec![p(false), AbstExt::Absent, p(false), p(true), p(false)],
        i.writer().unwrap(),
    ));
    sim.add(sy::Moore::new(
        "count",
        |s: &u32, r: &AbstExt<bool>| match r {
            AbstExt::Present(true) => 0,
            _ => s + 1,
        },
        |s: &u32| p(*s),
        0,
        i.reader().unwrap(),
        o.writer().unwrap(),
    ));
    sim.run().unwrap();
    assert_eq!(o.contents(), vec![p(0), p(1), p(2), p(3), p(0)]);
}

#[test]
fn test_sy_fill_replaces_absents() {
    let mut sim = Simulation::new();
    let (i, o) = (sim.signal("i"), sim.signal("o"));
    sim.add(sy::VSource::with_absents(
        "i",
        vec![AbstExt::Absent, p(4), AbstExt::Absent],
        i.writer().unwrap(),
    ));
    sim.add(sy::Fill::new("fill", 9, i.reader().unwrap(), o.writer().unwrap()));
    sim.run().unwrap();
    assert_eq!(o.contents(), vec![p(9), p(4), p(9)]);
}

#[test]
fn test_sy_zip_then_unzip_preserves_streams() {
    let mut sim = Simulation::new();
    let (a, b, z, x, y) = (
        sim.signal("a"),
        sim.signal("b"),
        sim.signal("z"),
        sim.signal("x"),
        sim.signal("y"),
    );
    sim.add(sy::VSource::with_absents("a", vec![p(1), AbstExt::Absent], a.writer().unwrap()));
    sim.add(sy::VSource::new("b", vec!['u', 'v'], b.writer().unwrap()));
    sim.add(sy::Zip::new("zip", a.reader().unwrap(), b.reader().unwrap(), z.writer().unwrap()));
    sim.add(sy::Unzip::new("unzip", z.reader().unwrap(), x.writer().unwrap(), y.writer().unwrap()));
    sim.run().unwrap();
    assert_eq!(x.contents(), vec![p(1), AbstExt::Absent]);
    assert_eq!(y.contents(), vec![p('u'), p('v')]);
}

#[test]
fn test_sy_multi_input_ends_with_shortest() {
    let mut sim = Simulation::new();
    let (a, b, o) = (sim.signal("a"), sim.signal("b"), sim.signal("o"));
    sim.add(sy::VSource::new("a", vec![1, 2, 3], a.writer().unwrap()));
    sim.add(sy::VSource::new("b", vec![1], b.writer().unwrap()));
    sim.add(sy::Comb2::new(
        "mul",
        |x: &AbstExt<i32>, y: &AbstExt<i32>| match (x, y) {
            (AbstExt::Present(x), AbstExt::Present(y)) => p(x * y),
            _ => AbstExt::Absent,
        },
        a.reader().unwrap(),
        b.reader().unwrap(),
        o.writer().unwrap(),
    ));
    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(o.contents(), vec![p(1)]);
}

// ============================================================================
// SY / SDF Interfaces
// ============================================================================

#[test]
fn test_sy_to_sdf_to_sy_pipeline() {
    // SY values with absents, decimated by 2 in SDF, back to SY
    let mut sim = Simulation::new();
    let (s1, d1, d2, s2) = (sim.signal("s1"), sim.signal("d1"), sim.signal("d2"), sim.signal("s2"));
    sim.add(sy::VSource::with_absents(
        "src",
        vec![p(1), AbstExt::Absent, p(2), p(3), AbstExt::Absent, p(4)],
        s1.writer().unwrap(),
    ));
    sim.add(mi::Sy2Sdf::new("sy2sdf", s1.reader().unwrap(), d1.writer().unwrap()));
    sim.add(sdf::Comb::new(
        "decimate",
        |xs: &[i32]| vec![xs[0] + xs[1]],
        1,
        2,
        d1.reader().unwrap(),
        d2.writer().unwrap(),
    ));
    sim.add(mi::Sdf2Sy::new("sdf2sy", d2.reader().unwrap(), s2.writer().unwrap()));
    sim.run().unwrap();
    assert_eq!(s2.contents(), vec![p(3), p(7)]);
}
