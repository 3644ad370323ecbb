//! Tests for the continuous-time MoC.
//!
//! These tests verify the correctness of:
//! - Sub-signal overlap when two inputs have different segment boundaries
//! - Lazy composition: nothing is sampled until a consumer asks
//! - Delay versus shift
//! - Sampling sinks

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use forsyde::moc::ct;
use forsyde::sub_signal::overlap;
use forsyde::{OutputPort, Signal, SimError, SimTime, Simulation, SubSignal};
use parking_lot::Mutex;
use proptest::prelude::*;

const HORIZON: SimTime = 100;

/// A closed signal pre-filled with `parts`.
fn feed(sim: &mut Simulation, name: &str, parts: Vec<SubSignal>) -> Signal<SubSignal> {
    let sig = sim.signal(name);
    let mut w = sig.writer().unwrap();
    w.write_all(parts);
    w.flush();
    w.close();
    sig
}

/// Constant segments between consecutive cut points, valued by index.
fn segments(cuts: &BTreeSet<SimTime>) -> Vec<SubSignal> {
    let mut bounds: Vec<SimTime> = vec![0];
    bounds.extend(cuts.iter().copied());
    bounds.push(HORIZON);
    bounds
        .windows(2)
        .enumerate()
        .map(|(i, w)| SubSignal::constant(w[0], w[1], i as f64))
        .collect()
}

/// Index of the segment containing `t`.
fn segment_index(cuts: &BTreeSet<SimTime>, t: SimTime) -> f64 {
    cuts.range(..=t).count() as f64
}

// ============================================================================
// Overlap Tests
// ============================================================================

#[test]
fn test_overlap_of_disjoint_is_empty() {
    let a = SubSignal::constant(0, 5, 1.0);
    let b = SubSignal::constant(7, 9, 1.0);
    let (s, e) = overlap(&a, &b);
    assert!(s >= e);
}

proptest! {
    #[test]
    fn prop_overlap_bounds(s1 in 0u64..50, d1 in 0u64..50, s2 in 0u64..50, d2 in 0u64..50) {
        let a = SubSignal::constant(s1, s1 + d1, 0.0);
        let b = SubSignal::constant(s2, s2 + d2, 0.0);
        prop_assert_eq!(overlap(&a, &b), (s1.max(s2), (s1 + d1).min(s2 + d2)));
    }

    #[test]
    fn prop_comb2_output_ranges_are_overlaps(
        cuts_a in prop::collection::btree_set(1u64..HORIZON, 0..8),
        cuts_b in prop::collection::btree_set(1u64..HORIZON, 0..8),
    ) {
        let mut sim = Simulation::new();
        let a = feed(&mut sim, "a", segments(&cuts_a));
        let b = feed(&mut sim, "b", segments(&cuts_b));
        let o = sim.signal("o");
        sim.add(ct::Comb2::new("sum", |x, y| x + 10.0 * y, a.reader().unwrap(), b.reader().unwrap(), o.writer().unwrap()));
        sim.run().unwrap();

        let all: BTreeSet<SimTime> = cuts_a.union(&cuts_b).copied().collect();
        let expected_ranges: Vec<(SimTime, SimTime)> = segments(&all).iter().map(SubSignal::range).collect();
        let out = o.contents();
        let ranges: Vec<_> = out.iter().map(SubSignal::range).collect();
        prop_assert_eq!(ranges, expected_ranges);

        for ss in &out {
            let (start, end) = ss.range();
            let want = segment_index(&cuts_a, start) + 10.0 * segment_index(&cuts_b, start);
            prop_assert_eq!(ss.sample(start).unwrap(), want);
            prop_assert_eq!(ss.sample(end - 1).unwrap(), want);
            let outside = matches!(ss.sample(end), Err(SimError::OutOfRange { .. }));
            prop_assert!(outside);
        }
    }
}

// ============================================================================
// Lazy Composition
// ============================================================================

#[test]
fn test_comb_does_not_sample_until_consumed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut sim = Simulation::new();
    let (src, mid, out) = (sim.signal("src"), sim.signal("mid"), sim.signal("out"));
    sim.add(ct::Source::new("ramp", |t| t as f64, 10, src.writer().unwrap()));
    sim.add(ct::Comb::new(
        "count",
        move |v| {
            counter.fetch_add(1, Ordering::SeqCst);
            v + 1.0
        },
        src.reader().unwrap(),
        mid.writer().unwrap(),
    ));
    sim.add(ct::Comb::new("neg", |v| -v, mid.reader().unwrap(), out.writer().unwrap()));
    sim.run().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let ss = &out.contents()[0];
    assert_eq!(ss.sample(4).unwrap(), -5.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_combn_sums_aligned_inputs() {
    let mut sim = Simulation::new();
    let ins: Vec<_> = (0..3)
        .map(|k| feed(&mut sim, &format!("in{}", k), vec![SubSignal::constant(0, 6, k as f64)]))
        .collect();
    let o = sim.signal("o");
    sim.add(ct::CombN::new(
        "sum",
        |vs: &[f64]| vs.iter().sum(),
        ins.iter().map(|s| s.reader().unwrap()).collect(),
        o.writer().unwrap(),
    ));
    sim.run().unwrap();
    assert_eq!(o.contents()[0].sample(3).unwrap(), 3.0);
}

// ============================================================================
// Delay, Shift and Sampling
// ============================================================================

#[test]
fn test_delay_keeps_function_shift_moves_it() {
    let mut sim = Simulation::new();
    let (a, b) = (
        feed(&mut sim, "a", vec![SubSignal::new(0, 10, |t| t as f64)]),
        feed(&mut sim, "b", vec![SubSignal::new(0, 10, |t| t as f64)]),
    );
    let (d, s) = (sim.signal("d"), sim.signal("s"));
    sim.add(ct::Delay::new("delay", 4, a.reader().unwrap(), d.writer().unwrap()));
    sim.add(ct::Shift::new("shift", 4, b.reader().unwrap(), s.writer().unwrap()));
    sim.run().unwrap();

    let (d, s) = (d.contents(), s.contents());
    // both start with a zero prefix over [0, 4)
    assert_eq!(d[0].range(), (0, 4));
    assert_eq!(s[0].sample(2).unwrap(), 0.0);
    assert_eq!(d[1].range(), (4, 14));
    assert_eq!(d[1].sample(6).unwrap(), 6.0);
    assert_eq!(s[1].sample(6).unwrap(), 2.0);
}

#[test]
fn test_sink_samples_constant_then_ramp() {
    let samples = Arc::new(Mutex::new(Vec::new()));
    let seen = samples.clone();

    let mut sim = Simulation::new();
    let i = feed(
        &mut sim,
        "i",
        vec![SubSignal::constant(0, 5, 1.0), SubSignal::new(5, 12, |t| t as f64)],
    );
    sim.add(ct::Sink::new("monitor", 4, move |t, v| seen.lock().push((t, v)), i.reader().unwrap()));
    sim.run().unwrap();

    assert_eq!(*samples.lock(), vec![(0, 1.0), (4, 1.0), (8, 8.0)]);
}

#[test]
fn test_constant_source_spans_whole_range() {
    let mut sim = Simulation::new();
    let o = sim.signal("o");
    sim.add(ct::Constant::new("k", 2.5, 40, o.writer().unwrap()));
    sim.run().unwrap();
    let out = o.contents();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].range(), (0, 40));
    assert_eq!(out[0].sample(39).unwrap(), 2.5);
}
